use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WeatherRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeatherRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WeatherRecords::Location)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeatherRecords::DateRange)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeatherRecords::WeatherData)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeatherRecords::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(WeatherRecords::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_weather_records_location_date_range")
                    .table(WeatherRecords::Table)
                    .col(WeatherRecords::Location)
                    .col(WeatherRecords::DateRange)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WeatherRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WeatherRecords {
    Table,
    Id,
    Location,
    DateRange,
    WeatherData,
    CreatedAt,
    UpdatedAt,
}
