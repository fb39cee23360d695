//! Financial reporting agent.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::capability::mentions_any;
use super::{Agent, Capability, ToolError, ToolParams, ToolSpec, group_thousands, money, pretty};
use crate::analysis::financial::{
    self, FORECAST_HISTORY_DAYS, KpiReport, ProfitReport, RevenueReport,
};
use crate::analysis::{self, window_start};
use crate::config::CostAssumptions;
use crate::db::{ProductRepository, PurchaseRepository, SessionRepository, UserRepository};

/// Matches "3 weeks", "90 days", "2 month" in a lowercased query.
static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(day|week|month)").expect("Invalid regex"));

const KEYWORDS: &[&str] = &[
    "revenue",
    "profit",
    "financial",
    "earnings",
    "income",
    "sales",
    "money",
    "cost",
    "expense",
    "margin",
    "roi",
    "ltv",
    "lifetime value",
    "financial report",
    "profit margin",
    "revenue report",
    "kpi",
    "payment",
    "discount",
    "forecast",
    "profitability",
];

const CAPABILITIES: &[Capability] = &[
    Capability::FinancialAnalysis,
    Capability::RevenueReporting,
    Capability::ProfitAnalysis,
    Capability::CostAnalysis,
];

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "generate_revenue_report",
        description: "Generate comprehensive revenue reports with breakdowns",
        parameters: &["time_period", "granularity"],
    },
    ToolSpec {
        name: "analyze_profit_margins",
        description: "Analyze profit margins by product, category, or time period",
        parameters: &["analysis_type", "time_period"],
    },
    ToolSpec {
        name: "get_financial_kpis",
        description: "Calculate key financial performance indicators",
        parameters: &["time_period"],
    },
    ToolSpec {
        name: "analyze_payment_methods",
        description: "Analyze revenue by payment method and trends",
        parameters: &["time_period"],
    },
    ToolSpec {
        name: "calculate_customer_ltv",
        description: "Calculate customer lifetime value and segmentation",
        parameters: &["calculation_method"],
    },
    ToolSpec {
        name: "generate_sales_forecast",
        description: "Generate sales and revenue forecasts",
        parameters: &["forecast_period"],
    },
    ToolSpec {
        name: "analyze_product_profitability",
        description: "Analyze profitability by product or category",
        parameters: &["time_period"],
    },
    ToolSpec {
        name: "get_cohort_revenue",
        description: "Analyze revenue by customer cohorts",
        parameters: &["cohort_period"],
    },
    ToolSpec {
        name: "analyze_discount_impact",
        description: "Analyze the financial impact of discounts and promotions",
        parameters: &["time_period"],
    },
    ToolSpec {
        name: "generate_financial_summary",
        description: "Generate executive financial summary report",
        parameters: &["time_period"],
    },
];

/// Default trailing window, in days.
const DEFAULT_DAYS: i64 = 30;

/// Longest forecast horizon, in days.
pub const MAX_FORECAST_DAYS: i64 = 365;

/// What a free-text query asks the financial agent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    RevenueReport(i64),
    Profit,
    Kpis,
    Payments,
    Ltv,
    Forecast,
    Discounts,
    Summary,
}

impl Intent {
    /// First matching keyword wins; anything unrecognized gets the
    /// executive summary.
    fn parse(query: &str) -> Self {
        let query = query.to_lowercase();
        if query.contains("revenue") && query.contains("report") {
            Self::RevenueReport(period_days(&query))
        } else if query.contains("profit") {
            Self::Profit
        } else if query.contains("kpi") || query.contains("financial") {
            Self::Kpis
        } else if query.contains("payment") {
            Self::Payments
        } else if query.contains("ltv") || query.contains("lifetime") {
            Self::Ltv
        } else if query.contains("forecast") {
            Self::Forecast
        } else if query.contains("discount") {
            Self::Discounts
        } else {
            Self::Summary
        }
    }
}

/// Reporting window named in a lowercased query; weeks are 7 days and
/// months 30. Defaults to 30 days.
fn period_days(query: &str) -> i64 {
    PERIOD_RE
        .captures(query)
        .and_then(|caps| {
            let number: i64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = match caps.get(2)?.as_str() {
                "week" => 7,
                "month" => 30,
                _ => 1,
            };
            number.checked_mul(unit)
        })
        .unwrap_or(DEFAULT_DAYS)
}

/// Agent for revenue, profit, lifetime value and forecasting.
pub struct FinancialAgent {
    pool: PgPool,
    costs: CostAssumptions,
}

impl FinancialAgent {
    pub const ID: &'static str = "financial_reporting_agent";

    /// Create a financial agent reading from `pool` and estimating costs
    /// with `costs`.
    #[must_use]
    pub const fn new(pool: PgPool, costs: CostAssumptions) -> Self {
        Self { pool, costs }
    }

    /// The cost model applied to revenue.
    #[must_use]
    pub const fn costs(&self) -> &CostAssumptions {
        &self.costs
    }

    async fn revenue(&self, now: DateTime<Utc>, days: i64) -> Result<RevenueReport, ToolError> {
        let start = window_start(now, days);
        let orders = PurchaseRepository::new(&self.pool);
        let current = orders.made_between(start, None, None).await?;
        let previous = orders
            .made_between(window_start(start, days), Some(start), None)
            .await?;
        let catalog = analysis::catalog(ProductRepository::new(&self.pool).all().await?);

        Ok(financial::revenue_report(
            &current, &previous, &catalog, start, now, days,
        ))
    }

    async fn profit(&self, now: DateTime<Utc>, days: i64) -> Result<ProfitReport, ToolError> {
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(window_start(now, days), None, None)
            .await?;
        let catalog = analysis::catalog(ProductRepository::new(&self.pool).all().await?);
        Ok(financial::profit_margins(
            &purchases,
            &catalog,
            &self.costs,
            days,
        ))
    }

    async fn kpis(&self, now: DateTime<Utc>, days: i64) -> Result<KpiReport, ToolError> {
        let since = window_start(now, days);
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(since, None, None)
            .await?;
        let customers = UserRepository::new(&self.pool).count().await?;
        let sessions = SessionRepository::new(&self.pool)
            .started_since(since, None, None)
            .await?;
        Ok(financial::financial_kpis(
            &purchases,
            usize::try_from(customers).unwrap_or(0),
            sessions.len(),
            &self.costs,
            days,
        ))
    }

    #[instrument(skip(self))]
    async fn revenue_report(&self, days: i64) -> Result<Value, ToolError> {
        Ok(serde_json::to_value(self.revenue(Utc::now(), days).await?)?)
    }

    #[instrument(skip(self))]
    async fn profit_margins(&self, days: i64) -> Result<Value, ToolError> {
        Ok(serde_json::to_value(self.profit(Utc::now(), days).await?)?)
    }

    #[instrument(skip(self))]
    async fn financial_kpis(&self, days: i64) -> Result<Value, ToolError> {
        Ok(serde_json::to_value(self.kpis(Utc::now(), days).await?)?)
    }

    #[instrument(skip(self))]
    async fn payment_methods(&self, days: i64) -> Result<Value, ToolError> {
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(window_start(Utc::now(), days), None, None)
            .await?;
        Ok(serde_json::to_value(financial::payment_methods(
            &purchases, days,
        ))?)
    }

    #[instrument(skip(self))]
    async fn customer_ltv(&self, method: &str) -> Result<Value, ToolError> {
        let users = UserRepository::new(&self.pool).all().await?;
        let purchases = PurchaseRepository::new(&self.pool).all().await?;
        Ok(serde_json::to_value(financial::customer_ltv(
            &users, &purchases, method,
        ))?)
    }

    #[instrument(skip(self))]
    async fn sales_forecast(&self, forecast_days: i64) -> Result<Value, ToolError> {
        let history = PurchaseRepository::new(&self.pool)
            .made_between(
                window_start(Utc::now(), FORECAST_HISTORY_DAYS),
                None,
                None,
            )
            .await?;
        let report = financial::sales_forecast(&history, forecast_days).ok_or(
            ToolError::InsufficientData("Insufficient historical data for forecasting"),
        )?;
        Ok(serde_json::to_value(report)?)
    }

    #[instrument(skip(self))]
    async fn product_profitability(&self, days: i64) -> Result<Value, ToolError> {
        let products = ProductRepository::new(&self.pool).all().await?;
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(window_start(Utc::now(), days), None, None)
            .await?;
        Ok(serde_json::to_value(financial::product_profitability(
            &products,
            &purchases,
            &self.costs,
            days,
        ))?)
    }

    #[instrument(skip(self))]
    async fn cohort_revenue(&self, period: &str) -> Result<Value, ToolError> {
        let users = UserRepository::new(&self.pool).all().await?;
        let purchases = PurchaseRepository::new(&self.pool).all().await?;
        Ok(serde_json::to_value(financial::cohort_revenue(
            &users, &purchases, period,
        ))?)
    }

    #[instrument(skip(self))]
    async fn discount_impact(&self, days: i64) -> Result<Value, ToolError> {
        let purchases = PurchaseRepository::new(&self.pool)
            .made_between(window_start(Utc::now(), days), None, None)
            .await?;
        let report = financial::discount_impact(&purchases, days).ok_or(
            ToolError::InsufficientData("No purchase data available for analysis"),
        )?;
        Ok(serde_json::to_value(report)?)
    }

    #[instrument(skip(self))]
    async fn financial_summary(&self, days: i64) -> Result<Value, ToolError> {
        let now = Utc::now();
        let summary = financial::financial_summary(
            self.revenue(now, days).await?,
            self.profit(now, days).await?,
            self.kpis(now, days).await?,
            now,
            days,
        );
        Ok(serde_json::to_value(summary)?)
    }
}

#[async_trait]
impl Agent for FinancialAgent {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Financial Analyst"
    }

    fn description(&self) -> &'static str {
        "Specializes in revenue analysis, profit margins, financial reporting, cost analysis, and business performance metrics"
    }

    fn capabilities(&self) -> &'static [Capability] {
        CAPABILITIES
    }

    fn tool_prefix(&self) -> &'static str {
        "financial_"
    }

    fn tools(&self) -> &'static [ToolSpec] {
        TOOLS
    }

    fn can_handle(&self, query: &str) -> bool {
        mentions_any(query, KEYWORDS)
    }

    async fn process_query(&self, query: &str) -> Result<Value, ToolError> {
        let intent = Intent::parse(query);
        debug!(?intent, "Financial query dispatched");

        match intent {
            Intent::RevenueReport(days) => self.revenue_report(days).await,
            Intent::Profit => self.profit_margins(DEFAULT_DAYS).await,
            Intent::Kpis => self.financial_kpis(DEFAULT_DAYS).await,
            Intent::Payments => self.payment_methods(DEFAULT_DAYS).await,
            Intent::Ltv => self.customer_ltv("historical").await,
            Intent::Forecast => self.sales_forecast(DEFAULT_DAYS).await,
            Intent::Discounts => self.discount_impact(DEFAULT_DAYS).await,
            Intent::Summary => self.financial_summary(DEFAULT_DAYS).await,
        }
    }

    #[instrument(skip(self, params), fields(agent = Self::ID))]
    async fn call_tool(&self, name: &str, params: &ToolParams) -> Result<Value, ToolError> {
        match name {
            "generate_revenue_report" => {
                self.revenue_report(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "analyze_profit_margins" => {
                self.profit_margins(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "get_financial_kpis" => {
                self.financial_kpis(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "analyze_payment_methods" => {
                self.payment_methods(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "calculate_customer_ltv" => {
                self.customer_ltv(params.str_or("calculation_method", "historical")?)
                    .await
            }
            "generate_sales_forecast" => {
                let days = params.days_or("forecast_period", DEFAULT_DAYS)?;
                if days > MAX_FORECAST_DAYS {
                    return Err(ToolError::invalid(
                        "forecast_period",
                        format!("must be at most {MAX_FORECAST_DAYS} days"),
                    ));
                }
                self.sales_forecast(days).await
            }
            "analyze_product_profitability" => {
                self.product_profitability(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "get_cohort_revenue" => {
                self.cohort_revenue(params.str_or("cohort_period", "month")?)
                    .await
            }
            "analyze_discount_impact" => {
                self.discount_impact(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            "generate_financial_summary" => {
                self.financial_summary(params.days_or("time_period", DEFAULT_DAYS)?)
                    .await
            }
            other => Err(ToolError::UnknownTool {
                tool: other.to_string(),
                agent: self.name(),
            }),
        }
    }

    fn summarize(&self, data: &Value) -> String {
        summarize(data)
            .unwrap_or_else(|| format!("Financial Reporting Agent processed: {}", pretty(data)))
    }
}

/// Templated summary of a revenue report or a profit analysis.
fn summarize(data: &Value) -> Option<String> {
    let field = |section: &Value, key: &str| section.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let insight = |key: &str| {
        data.pointer(&format!("/insights/{key}"))
            .and_then(Value::as_str)
            .unwrap_or("N/A")
            .to_string()
    };

    if let Some(summary) = data.get("revenue_summary") {
        let period = data
            .pointer("/report_period/days")
            .map_or_else(|| "N/A".to_string(), Value::to_string);
        let orders = summary
            .get("total_orders")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        return Some(format!(
            "Financial Report Summary ({period} days):\n\
             \n\
             💰 Revenue Performance:\n\
             • Total Revenue: ${}\n\
             • Total Orders: {}\n\
             • Average Order Value: ${:.2}\n\
             • Growth Rate: {:.1}%\n\
             \n\
             📊 Key Insights:\n\
             • Top Category: {}\n\
             • Preferred Payment: {}\n\
             • Peak Day: {}",
            money(field(summary, "total_revenue")),
            group_thousands(&orders.to_string()),
            field(summary, "average_order_value"),
            field(summary, "growth_rate_percent"),
            insight("top_revenue_category"),
            insight("preferred_payment_method"),
            insight("peak_revenue_day"),
        ));
    }

    let profit = data.get("profit_analysis")?;
    let margins = data.get("margin_analysis").unwrap_or(&Value::Null);
    Some(format!(
        "Profit Analysis Summary:\n\
         \n\
         💸 Cost Structure:\n\
         • Total Revenue: ${}\n\
         • Cost of Goods Sold: ${}\n\
         • Operational Costs: ${}\n\
         \n\
         📈 Profitability:\n\
         • Gross Profit: ${}\n\
         • Net Profit: ${}\n\
         • Gross Margin: {:.1}%\n\
         • Net Margin: {:.1}%",
        money(field(profit, "total_revenue")),
        money(field(profit, "cost_of_goods_sold")),
        money(field(profit, "operational_costs")),
        money(field(profit, "gross_profit")),
        money(field(profit, "net_profit")),
        field(margins, "gross_margin_percent"),
        field(margins, "net_margin_percent"),
    ))
}
