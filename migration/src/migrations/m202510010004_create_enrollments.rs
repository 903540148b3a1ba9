use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010004_create_enrollments"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("enrollments"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("activity_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("motivation")).text().not_null())
                    .col(ColumnDef::new(Alias::new("availability")).text().null())
                    .col(ColumnDef::new(Alias::new("experience")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Alias::new("enrolled_at")).timestamp().not_null())
                    .col(ColumnDef::new(Alias::new("cancelled_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("validated_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("reviewed_by")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("reviewed_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("review_message")).text().null())
                    .col(ColumnDef::new(Alias::new("rejection_reason")).text().null())
                    .col(
                        ColumnDef::new(Alias::new("feedback_submitted"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_student")
                            .from(Alias::new("enrollments"), Alias::new("student_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_activity")
                            .from(Alias::new("enrollments"), Alias::new("activity_id"))
                            .to(Alias::new("activities"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_reviewer")
                            .from(Alias::new("enrollments"), Alias::new("reviewed_by"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one live enrollment per (student, activity); cancelled rows are history.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_enrollments_live \
                 ON enrollments (student_id, activity_id) \
                 WHERE status <> 'cancelled'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("enrollments")).to_owned())
            .await
    }
}
