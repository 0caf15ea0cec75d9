//! Table and column names shared by the loader, the SQL reports and the
//! persisted metric tables.

// ── Branches ────────────────────────────────────────────────────────────────
pub mod branches {
    pub const TABLE: &str = "branches";
    pub const BRANCH_ID: &str = "branch_id";
    pub const BRANCH_NAME: &str = "branch_name";
    pub const CITY: &str = "city";
}

// ── Articles (catalog) ──────────────────────────────────────────────────────
pub mod articles {
    pub const TABLE: &str = "articles";
    pub const ARTICLE_ID: &str = "article_id";
    pub const ARTICLE_NAME: &str = "article_name";
    pub const CATEGORY: &str = "category";
    pub const PRICE: &str = "price";
}

// ── Sales transactions ──────────────────────────────────────────────────────
pub mod sales {
    pub const TABLE: &str = "sales";
    pub const TRANSACTION_ID: &str = "transaction_id";
    pub const ARTICLE_ID: &str = "article_id";
    pub const QUANTITY: &str = "quantity";
    pub const SALE_DATE: &str = "sale_date";
    pub const BRANCH_ID: &str = "branch_id";
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
}

// ── Enriched transactions, persisted ────────────────────────────────────────
pub mod sales_detail {
    pub const TABLE: &str = "sales_detail";
}

// ── Persisted metrics ───────────────────────────────────────────────────────
pub mod metrics {
    pub const SALES_BY_BRANCH: &str = "metrics_sales_by_branch";
    pub const SALES_BY_BRANCH_COLUMNS: [&str; 2] = ["branch_id", "total_sales"];

    pub const TOP_ARTICLES: &str = "metrics_top_articles";
    pub const TOP_ARTICLES_COLUMNS: [&str; 2] = ["article_name", "total_quantity"];

    pub const MONTHLY_REVENUE: &str = "metrics_monthly_revenue";
    pub const MONTHLY_REVENUE_COLUMNS: [&str; 3] = ["year", "month", "revenue"];

    pub const CATEGORY_REVENUE: &str = "metrics_category_revenue";
    pub const CATEGORY_REVENUE_COLUMNS: [&str; 2] = ["category", "revenue"];
}
