use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010003_create_sessions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("sessions"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("activity_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("start_time")).time().not_null())
                    .col(ColumnDef::new(Alias::new("end_time")).time().not_null())
                    .col(ColumnDef::new(Alias::new("location")).string().not_null())
                    .col(ColumnDef::new(Alias::new("max_participants")).integer().null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string_len(16)
                            .not_null()
                            .default("scheduled"),
                    )
                    // Absent QR code means manual check-in only.
                    .col(ColumnDef::new(Alias::new("qr_code")).string_len(64).null())
                    .col(ColumnDef::new(Alias::new("qr_expires_at")).timestamp().null())
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
                    .check(Expr::cust("end_time > start_time"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_activity")
                            .from(Alias::new("sessions"), Alias::new("activity_id"))
                            .to(Alias::new("activities"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_sessions_activity_slot")
                    .table(Alias::new("sessions"))
                    .col(Alias::new("activity_id"))
                    .col(Alias::new("date"))
                    .col(Alias::new("start_time"))
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("sessions")).to_owned())
            .await
    }
}
