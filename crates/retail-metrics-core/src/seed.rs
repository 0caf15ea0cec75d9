//! Creates the input tables with a small deterministic demo dataset so the
//! job can run against a fresh store. Seeding twice leaves the data unchanged.

use sqlx::sqlite::SqliteQueryResult;
use tracing::info;

use crate::db::DbPool;
use crate::error::Result;

const BRANCHES: [(i64, &str, &str); 3] = [
    (1, "Downtown", "Springfield"),
    (2, "Riverside", "Springfield"),
    (3, "Harbor", "Shelbyville"),
];

const ARTICLES: [(i64, &str, &str, f64); 6] = [
    (1, "Espresso Machine", "Appliances", 249.0),
    (2, "Coffee Grinder", "Appliances", 89.5),
    (3, "Arabica Beans 1kg", "Groceries", 18.9),
    (4, "Ceramic Mug", "Kitchenware", 12.0),
    (5, "Milk Frother", "Appliances", 39.99),
    (6, "Paper Filters", "Groceries", 4.5),
];

const DEMO_SALES: i64 = 48;

pub async fn run(pool: &DbPool) -> Result<()> {
    create_tables(pool).await?;
    seed_branches(pool).await?;
    seed_articles(pool).await?;
    seed_sales(pool).await?;
    Ok(())
}

async fn create_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS branches (
            branch_id INTEGER PRIMARY KEY,
            branch_name TEXT NOT NULL,
            city TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            article_id INTEGER PRIMARY KEY,
            article_name TEXT NOT NULL,
            category TEXT,
            price REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sales (
            transaction_id INTEGER PRIMARY KEY,
            article_id INTEGER,
            quantity INTEGER,
            sale_date TEXT,
            branch_id INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_branches(pool: &DbPool) -> Result<()> {
    for (branch_id, name, city) in BRANCHES {
        let result: SqliteQueryResult = sqlx::query(
            "INSERT OR IGNORE INTO branches (branch_id, branch_name, city) VALUES (?1, ?2, ?3)",
        )
        .bind(branch_id)
        .bind(name)
        .bind(city)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(branch_id, name, "Seeded branch");
        }
    }
    Ok(())
}

async fn seed_articles(pool: &DbPool) -> Result<()> {
    for (article_id, name, category, price) in ARTICLES {
        let result: SqliteQueryResult = sqlx::query(
            r#"
            INSERT OR IGNORE INTO articles (article_id, article_name, category, price)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(article_id)
        .bind(name)
        .bind(category)
        .bind(price)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(article_id, name, "Seeded article");
        }
    }
    Ok(())
}

async fn seed_sales(pool: &DbPool) -> Result<()> {
    let mut seeded = 0;
    for transaction_id in 1..=DEMO_SALES {
        let step = transaction_id - 1;
        let article_id = (step * 5) % ARTICLES.len() as i64 + 1;
        let branch_id = step % BRANCHES.len() as i64 + 1;
        let quantity = (step * 7) % 5 + 1;
        let sale_date = format!("2023-{:02}-{:02}", step % 12 + 1, (step * 3) % 28 + 1);

        let result: SqliteQueryResult = sqlx::query(
            r#"
            INSERT OR IGNORE INTO sales (transaction_id, article_id, quantity, sale_date, branch_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(transaction_id)
        .bind(article_id)
        .bind(quantity)
        .bind(sale_date)
        .bind(branch_id)
        .execute(pool)
        .await?;

        seeded += result.rows_affected();
    }

    if seeded > 0 {
        info!(rows = seeded, "Seeded sales");
    }
    Ok(())
}
