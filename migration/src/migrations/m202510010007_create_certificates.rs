use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510010007_create_certificates"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("certificates"))
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
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("certificate_number"))
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("total_hours")).double().not_null())
                    .col(ColumnDef::new(Alias::new("issued_at")).timestamp().not_null())
                    .col(ColumnDef::new(Alias::new("issued_by")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("artifact_url")).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_enrollment")
                            .from(Alias::new("certificates"), Alias::new("enrollment_id"))
                            .to(Alias::new("enrollments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("certificates")).to_owned())
            .await
    }
}
