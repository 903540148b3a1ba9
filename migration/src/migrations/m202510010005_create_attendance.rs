use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010005_create_attendance"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("enrollment_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("session_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("method")).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string_len(16)
                            .not_null()
                            .default("present"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("checked_in_at"))
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("checked_in_by"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("latitude")).double().null())
                    .col(ColumnDef::new(Alias::new("longitude")).double().null())
                    .col(ColumnDef::new(Alias::new("accuracy")).double().null())
                    .col(
                        ColumnDef::new(Alias::new("hours_credited"))
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("hours_overridden"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alias::new("notes")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    // One check-in per (enrollment, session); concurrent duplicates fail here.
                    .primary_key(
                        Index::create()
                            .col(Alias::new("enrollment_id"))
                            .col(Alias::new("session_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_enrollment")
                            .from(Alias::new("attendance"), Alias::new("enrollment_id"))
                            .to(Alias::new("enrollments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_session")
                            .from(Alias::new("attendance"), Alias::new("session_id"))
                            .to(Alias::new("sessions"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("attendance")).to_owned())
            .await
    }
}
