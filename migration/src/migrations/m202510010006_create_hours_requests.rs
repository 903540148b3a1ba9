use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010006_create_hours_requests"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("hours_requests"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("enrollment_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("activity_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("hours")).double().not_null())
                    .col(ColumnDef::new(Alias::new("approved_hours")).double().null())
                    .col(ColumnDef::new(Alias::new("description")).text().not_null())
                    .col(ColumnDef::new(Alias::new("evidence_urls")).json().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Alias::new("reviewed_by")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("reviewed_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("professor_notes")).text().null())
                    .col(ColumnDef::new(Alias::new("rejection_reason")).text().null())
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
                    .check(Expr::cust("hours > 0 AND hours <= 24"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hours_requests_enrollment")
                            .from(Alias::new("hours_requests"), Alias::new("enrollment_id"))
                            .to(Alias::new("enrollments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hours_requests_activity")
                            .from(Alias::new("hours_requests"), Alias::new("activity_id"))
                            .to(Alias::new("activities"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hours_requests_enrollment_status")
                    .table(Alias::new("hours_requests"))
                    .col(Alias::new("enrollment_id"))
                    .col(Alias::new("status"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("hours_requests")).to_owned())
            .await
    }
}
