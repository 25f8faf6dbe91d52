use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Indexes on enrollments for roster and per-student lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_course_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_student_id")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .to_owned(),
            )
            .await?;

        // Index on assignments.course_id for per-course listings
        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_course_id")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        // Indexes on submissions for per-assignment and per-student listings
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_assignment_id")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_student_id")
                    .table(Submissions::Table)
                    .col(Submissions::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        manager
            .drop_index(Index::drop().name("idx_submissions_student_id").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_submissions_assignment_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_assignments_course_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_enrollments_student_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_enrollments_course_id").to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Enrollments {
    Table,
    CourseId,
    StudentId,
}

#[derive(Iden)]
enum Assignments {
    Table,
    CourseId,
}

#[derive(Iden)]
enum Submissions {
    Table,
    AssignmentId,
    StudentId,
}
