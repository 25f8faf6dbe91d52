use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::InstructorId).string().not_null())
                    .col(ColumnDef::new(Courses::InstructorName).string().not_null())
                    .col(ColumnDef::new(Courses::Category).string().not_null())
                    .col(ColumnDef::new(Courses::Level).string().not_null())
                    .col(ColumnDef::new(Courses::Duration).integer().not_null())
                    .col(ColumnDef::new(Courses::MaxStudents).integer().not_null())
                    .col(
                        ColumnDef::new(Courses::CurrentEnrollments)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Courses::EnrolledStudents)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::Assignments).json_binary().not_null())
                    .col(
                        ColumnDef::new(Courses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Courses::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Courses::Syllabus).json_binary())
                    .col(ColumnDef::new(Courses::Prerequisites).json_binary())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create students table (keyed by the external user identity)
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .col(ColumnDef::new(Students::Email).string().not_null())
                    .col(
                        ColumnDef::new(Students::EnrolledCourses)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Students::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Students::AcademicLevel).string())
                    .col(ColumnDef::new(Students::Major).string())
                    .col(ColumnDef::new(Students::ProfileImage).string())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create enrollments table. No unique constraint on
        // (course_id, student_id); duplicates are screened before insert.
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Enrollments::StudentId).string().not_null())
                    .col(ColumnDef::new(Enrollments::StudentName).string().not_null())
                    .col(ColumnDef::new(Enrollments::StudentEmail).string().not_null())
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Enrollments::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Enrollments::LastAccessedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-course_id")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignments table
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().not_null())
                    .col(ColumnDef::new(Assignments::Instructions).text())
                    .col(
                        ColumnDef::new(Assignments::DueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::MaxPoints).integer().not_null())
                    .col(ColumnDef::new(Assignments::AssignmentType).string().not_null())
                    .col(
                        ColumnDef::new(Assignments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Assignments::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Assignments::Attachments)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::SubmissionFormat)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::SubmissionCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Assignments::AllowLateSubmissions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assignments::AllowMultipleSubmissions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignments-course_id")
                            .from(Assignments::Table, Assignments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create submissions table
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::AssignmentId).uuid().not_null())
                    .col(ColumnDef::new(Submissions::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Submissions::StudentId).string().not_null())
                    .col(ColumnDef::new(Submissions::StudentName).string().not_null())
                    .col(ColumnDef::new(Submissions::StudentEmail).string().not_null())
                    .col(ColumnDef::new(Submissions::SubmissionText).text())
                    .col(
                        ColumnDef::new(Submissions::Attachments)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::IsLate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Submissions::Status).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmissionNumber)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Submissions::Grade).integer())
                    .col(ColumnDef::new(Submissions::MaxPoints).integer().not_null())
                    .col(ColumnDef::new(Submissions::Feedback).text())
                    .col(ColumnDef::new(Submissions::GradedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Submissions::GradedBy).string())
                    .col(
                        ColumnDef::new(Submissions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-assignment_id")
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Title,
    Description,
    InstructorId,
    InstructorName,
    Category,
    Level,
    Duration,
    MaxStudents,
    CurrentEnrollments,
    EnrolledStudents,
    Assignments,
    IsActive,
    Tags,
    Syllabus,
    Prerequisites,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    Name,
    Email,
    EnrolledCourses,
    IsActive,
    AcademicLevel,
    Major,
    ProfileImage,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    CourseId,
    StudentId,
    StudentName,
    StudentEmail,
    EnrolledAt,
    Status,
    Progress,
    LastAccessedAt,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    Instructions,
    DueDate,
    MaxPoints,
    AssignmentType,
    IsActive,
    CreatedBy,
    Attachments,
    SubmissionFormat,
    SubmissionCount,
    AllowLateSubmissions,
    AllowMultipleSubmissions,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    CourseId,
    StudentId,
    StudentName,
    StudentEmail,
    SubmissionText,
    Attachments,
    SubmittedAt,
    IsLate,
    Status,
    SubmissionNumber,
    Grade,
    MaxPoints,
    Feedback,
    GradedAt,
    GradedBy,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
