//! Financial analytics: revenue, margins, KPIs, lifetime value, forecasts.
//!
//! Costs are never stored; they are estimated from revenue with the
//! configured [`CostAssumptions`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storelens_core::{PaymentMethod, ProductId, UserId};

use super::{Catalog, arg_max, count, percent, ratio, round2};
use crate::config::CostAssumptions;
use crate::models::{Product, Purchase, User};

fn revenue_of<'a>(purchases: impl IntoIterator<Item = &'a Purchase>) -> f64 {
    purchases.into_iter().map(Purchase::amount).sum()
}

fn rounded<K: Ord>(map: BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    map.into_iter().map(|(k, v)| (k, round2(v))).collect()
}

// =============================================================================
// Revenue
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportPeriod {
    pub days: i64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
    pub growth_rate_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueBreakdown {
    pub by_category: BTreeMap<String, f64>,
    pub by_payment_method: BTreeMap<PaymentMethod, f64>,
    pub daily_revenue: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueInsights {
    pub top_revenue_category: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub peak_revenue_day: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub report_period: ReportPeriod,
    pub revenue_summary: RevenueSummary,
    pub revenue_breakdown: RevenueBreakdown,
    pub insights: RevenueInsights,
}

/// Revenue over `[start, now]` with category, payment and daily breakdowns.
///
/// Growth compares against `previous`, the equal-length window before
/// `start`: `(current - previous) / max(previous, 1) * 100`. Purchases of
/// products missing from `catalog` count toward totals but no category.
#[must_use]
pub fn revenue_report(
    purchases: &[Purchase],
    previous: &[Purchase],
    catalog: &Catalog,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    days: i64,
) -> RevenueReport {
    let total_revenue = revenue_of(purchases);
    let previous_revenue = revenue_of(previous);

    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_payment: BTreeMap<PaymentMethod, f64> = BTreeMap::new();
    let mut daily: BTreeMap<String, f64> = BTreeMap::new();
    for purchase in purchases {
        if let Some(product) = catalog.get(&purchase.product_id) {
            *by_category.entry(product.category.clone()).or_insert(0.0) += purchase.amount();
        }
        *by_payment.entry(purchase.payment_method).or_insert(0.0) += purchase.amount();
        *daily
            .entry(purchase.purchase_date.format("%Y-%m-%d").to_string())
            .or_insert(0.0) += purchase.amount();
    }

    let insights = RevenueInsights {
        top_revenue_category: arg_max(by_category.iter().map(|(c, &v)| (c.clone(), v))),
        preferred_payment_method: arg_max(by_payment.iter().map(|(&m, &v)| (m, v))),
        peak_revenue_day: arg_max(daily.iter().map(|(d, &v)| (d.clone(), v))),
    };

    RevenueReport {
        report_period: ReportPeriod {
            days,
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: now.format("%Y-%m-%d").to_string(),
        },
        revenue_summary: RevenueSummary {
            total_revenue: round2(total_revenue),
            total_orders: purchases.len(),
            average_order_value: round2(ratio(total_revenue, count(purchases.len()))),
            growth_rate_percent: round2(percent(
                total_revenue - previous_revenue,
                previous_revenue,
            )),
        },
        revenue_breakdown: RevenueBreakdown {
            by_category: rounded(by_category),
            by_payment_method: rounded(by_payment),
            daily_revenue: rounded(daily),
        },
        insights,
    }
}

// =============================================================================
// Profit
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfitBreakdown {
    pub total_revenue: f64,
    pub cost_of_goods_sold: f64,
    pub operational_costs: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarginAnalysis {
    pub gross_margin_percent: f64,
    pub net_margin_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitReport {
    pub analysis_period_days: i64,
    pub profit_analysis: ProfitBreakdown,
    pub margin_analysis: MarginAnalysis,
    pub profit_by_category: BTreeMap<String, f64>,
    pub cost_assumptions: CostAssumptions,
}

/// Gross and net profit of `purchases` under `costs`.
#[must_use]
pub fn profit_margins(
    purchases: &[Purchase],
    catalog: &Catalog,
    costs: &CostAssumptions,
    days: i64,
) -> ProfitReport {
    let revenue = revenue_of(purchases);
    let cogs = revenue * costs.cogs_percentage;
    let operational = revenue * costs.operational_cost_percentage;
    let gross_profit = revenue - cogs;
    let net_profit = revenue - cogs - operational;

    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    for purchase in purchases {
        if let Some(product) = catalog.get(&purchase.product_id) {
            let amount = purchase.amount();
            *by_category.entry(product.category.clone()).or_insert(0.0) +=
                amount - amount * costs.cogs_percentage;
        }
    }

    ProfitReport {
        analysis_period_days: days,
        profit_analysis: ProfitBreakdown {
            total_revenue: round2(revenue),
            cost_of_goods_sold: round2(cogs),
            operational_costs: round2(operational),
            gross_profit: round2(gross_profit),
            net_profit: round2(net_profit),
        },
        margin_analysis: MarginAnalysis {
            gross_margin_percent: round2(percent(gross_profit, revenue)),
            net_margin_percent: round2(percent(net_profit, revenue)),
        },
        profit_by_category: rounded(by_category),
        cost_assumptions: *costs,
    }
}

// =============================================================================
// KPIs
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RevenueKpis {
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub revenue_per_customer: f64,
    pub total_orders: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CustomerKpis {
    pub unique_purchasing_customers: usize,
    pub total_registered_customers: usize,
    pub customer_acquisition_rate: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfitabilityKpis {
    pub gross_profit: f64,
    pub estimated_roi: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OperationalKpis {
    pub total_sessions: usize,
    pub sessions_to_purchase_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiReport {
    pub kpi_period_days: i64,
    pub revenue_kpis: RevenueKpis,
    pub customer_kpis: CustomerKpis,
    pub profitability_kpis: ProfitabilityKpis,
    pub operational_kpis: OperationalKpis,
}

/// Headline revenue, customer, profitability and traffic indicators.
///
/// `purchases` and `session_count` cover the window; `registered_customers`
/// is the whole user base. Conversion is purchasing customers per session.
#[must_use]
pub fn financial_kpis(
    purchases: &[Purchase],
    registered_customers: usize,
    session_count: usize,
    costs: &CostAssumptions,
    days: i64,
) -> KpiReport {
    let revenue = revenue_of(purchases);
    let orders = purchases.len();
    let customers = purchases.iter().map(|p| p.user_id).collect::<HashSet<_>>().len();

    let gross_profit = revenue * (1.0 - costs.cogs_percentage);
    let roi = percent(gross_profit, revenue * costs.cogs_percentage);

    KpiReport {
        kpi_period_days: days,
        revenue_kpis: RevenueKpis {
            total_revenue: round2(revenue),
            average_order_value: round2(ratio(revenue, count(orders))),
            revenue_per_customer: round2(ratio(revenue, count(customers))),
            total_orders: orders,
        },
        customer_kpis: CustomerKpis {
            unique_purchasing_customers: customers,
            total_registered_customers: registered_customers,
            customer_acquisition_rate: round2(percent(
                count(customers),
                count(registered_customers),
            )),
            conversion_rate: if session_count > 0 {
                round2(percent(count(customers), count(session_count)))
            } else {
                0.0
            },
        },
        profitability_kpis: ProfitabilityKpis {
            gross_profit: round2(gross_profit),
            estimated_roi: round2(roi),
            profit_margin: round2(percent(gross_profit, revenue)),
        },
        operational_kpis: OperationalKpis {
            total_sessions: session_count,
            sessions_to_purchase_ratio: round2(ratio(count(session_count), count(orders))),
        },
    }
}

// =============================================================================
// Payment methods
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaymentStats {
    pub total_revenue: f64,
    pub order_count: usize,
    pub avg_order_value: f64,
    pub revenue_percentage: f64,
    pub order_percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaymentInsights {
    pub most_popular_payment: Option<PaymentMethod>,
    pub highest_revenue_payment: Option<PaymentMethod>,
    pub highest_aov_payment: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReport {
    pub analysis_period_days: i64,
    pub payment_method_analysis: BTreeMap<PaymentMethod, PaymentStats>,
    pub insights: PaymentInsights,
}

/// Revenue, order count and shares per payment method.
#[must_use]
pub fn payment_methods(purchases: &[Purchase], days: i64) -> PaymentReport {
    let total_revenue = revenue_of(purchases);
    let total_orders = purchases.len();

    let mut grouped: BTreeMap<PaymentMethod, (f64, usize)> = BTreeMap::new();
    for purchase in purchases {
        let entry = grouped.entry(purchase.payment_method).or_insert((0.0, 0));
        entry.0 += purchase.amount();
        entry.1 += 1;
    }

    let raw: BTreeMap<PaymentMethod, (f64, usize, f64)> = grouped
        .into_iter()
        .map(|(m, (revenue, orders))| (m, (revenue, orders, ratio(revenue, count(orders)))))
        .collect();

    PaymentReport {
        analysis_period_days: days,
        insights: PaymentInsights {
            most_popular_payment: arg_max(raw.iter().map(|(&m, s)| (m, count(s.1)))),
            highest_revenue_payment: arg_max(raw.iter().map(|(&m, s)| (m, s.0))),
            highest_aov_payment: arg_max(raw.iter().map(|(&m, s)| (m, s.2))),
        },
        payment_method_analysis: raw
            .into_iter()
            .map(|(m, (revenue, orders, aov))| {
                (
                    m,
                    PaymentStats {
                        total_revenue: round2(revenue),
                        order_count: orders,
                        avg_order_value: round2(aov),
                        revenue_percentage: round2(percent(revenue, total_revenue)),
                        order_percentage: round2(percent(count(orders), count(total_orders))),
                    },
                )
            })
            .collect(),
    }
}

// =============================================================================
// Lifetime value
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CustomerLtv {
    pub user_id: UserId,
    pub user_name: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_order_value: f64,
    pub customer_lifespan_days: i64,
    pub purchase_frequency_per_month: f64,
    pub estimated_ltv: f64,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LtvSummary {
    pub average_ltv: f64,
    pub median_ltv: f64,
    pub total_customers_analyzed: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LtvSegments {
    pub high_value_customers: usize,
    pub medium_value_customers: usize,
    pub low_value_customers: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LtvMethodology {
    pub ltv_formula: &'static str,
    pub assumptions: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LtvReport {
    pub calculation_method: String,
    pub ltv_summary: LtvSummary,
    pub customer_segments: LtvSegments,
    pub top_customers_by_ltv: Vec<CustomerLtv>,
    pub methodology: LtvMethodology,
}

/// Historical lifetime value of every customer with at least one purchase.
///
/// Lifespan is whole days between first and last purchase plus one.
/// Frequency is purchases per 30 days of lifespan (at least one month), and
/// LTV = AOV × frequency × lifespan / 30. High value is above 1.5 × the
/// average, low value below half of it. The median is the upper median.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn customer_ltv(users: &[User], purchases: &[Purchase], method: &str) -> LtvReport {
    let mut by_user: HashMap<UserId, Vec<&Purchase>> = HashMap::new();
    for purchase in purchases {
        by_user.entry(purchase.user_id).or_default().push(purchase);
    }

    let mut customers: Vec<CustomerLtv> = users
        .iter()
        .filter_map(|user| {
            let orders = by_user.get(&user.id)?;
            let first = orders.iter().map(|p| p.purchase_date).min()?;
            let last = orders.iter().map(|p| p.purchase_date).max()?;

            let spent = revenue_of(orders.iter().copied());
            let lifespan_days = (last - first).num_days() + 1;
            let months = lifespan_days as f64 / 30.0;
            let aov = spent / count(orders.len());
            let frequency = ratio(count(orders.len()), months);

            Some(CustomerLtv {
                user_id: user.id,
                user_name: user.name.clone(),
                total_spent: round2(spent),
                purchase_count: orders.len(),
                avg_order_value: round2(aov),
                customer_lifespan_days: lifespan_days,
                purchase_frequency_per_month: round2(frequency),
                estimated_ltv: round2(aov * frequency * months),
                is_premium: user.is_premium,
            })
        })
        .collect();

    let average = ratio(
        customers.iter().map(|c| c.estimated_ltv).sum(),
        count(customers.len()),
    );
    let mut values: Vec<f64> = customers.iter().map(|c| c.estimated_ltv).collect();
    values.sort_by(f64::total_cmp);
    let median = values.get(values.len() / 2).copied().unwrap_or(0.0);

    let segments = LtvSegments {
        high_value_customers: values.iter().filter(|&&v| v > average * 1.5).count(),
        medium_value_customers: values
            .iter()
            .filter(|&&v| v >= average * 0.5 && v <= average * 1.5)
            .count(),
        low_value_customers: values.iter().filter(|&&v| v < average * 0.5).count(),
    };

    let analyzed = customers.len();
    customers.sort_by(|a, b| b.estimated_ltv.total_cmp(&a.estimated_ltv));
    customers.truncate(10);

    LtvReport {
        calculation_method: method.to_string(),
        ltv_summary: LtvSummary {
            average_ltv: round2(average),
            median_ltv: round2(median),
            total_customers_analyzed: analyzed,
        },
        customer_segments: segments,
        top_customers_by_ltv: customers,
        methodology: LtvMethodology {
            ltv_formula: "AOV × Purchase Frequency × Customer Lifespan (months)",
            assumptions: "Based on historical purchase data and observed behavior patterns",
        },
    }
}

// =============================================================================
// Forecast
// =============================================================================

/// Days of history the forecast looks back over.
pub const FORECAST_HISTORY_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeeklyProjection {
    pub week: i64,
    pub projected_revenue: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HistoricalAnalysis {
    pub data_period_days: i64,
    pub average_weekly_revenue: f64,
    pub trend_per_week: f64,
    pub total_weeks_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub total_projected_revenue: f64,
    pub weekly_projections: Vec<WeeklyProjection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub forecast_period_days: i64,
    pub historical_analysis: HistoricalAnalysis,
    pub forecast: Projection,
    pub methodology: &'static str,
    pub disclaimer: &'static str,
}

/// Linear weekly revenue projection from the trailing history.
///
/// `history` should span [`FORECAST_HISTORY_DAYS`]. Purchases are bucketed
/// into `%Y-W%U` weeks; the trend is (last week − first week) / (weeks − 1)
/// and week `i` projects `average + trend × i`, floored at zero. Returns
/// `None` when there is no history at all.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sales_forecast(history: &[Purchase], forecast_days: i64) -> Option<ForecastReport> {
    if history.is_empty() {
        return None;
    }

    let mut weekly: BTreeMap<String, f64> = BTreeMap::new();
    for purchase in history {
        *weekly
            .entry(purchase.purchase_date.format("%Y-W%U").to_string())
            .or_insert(0.0) += purchase.amount();
    }
    let revenues: Vec<f64> = weekly.values().copied().collect();
    let average = revenues.iter().sum::<f64>() / count(revenues.len());

    let (trend, weekly_projections) = match (revenues.first(), revenues.last()) {
        (Some(first), Some(last)) if revenues.len() >= 2 => {
            let trend = (last - first) / count(revenues.len() - 1);
            let projections = (1..=forecast_days.max(0) / 7)
                .map(|week| WeeklyProjection {
                    week,
                    projected_revenue: round2((average + trend * week as f64).max(0.0)),
                    confidence: if week <= 4 {
                        Confidence::Medium
                    } else {
                        Confidence::Low
                    },
                })
                .collect();
            (trend, projections)
        }
        _ => (0.0, Vec::new()),
    };

    let total: f64 = weekly_projections
        .iter()
        .map(|p: &WeeklyProjection| p.projected_revenue)
        .sum();

    Some(ForecastReport {
        forecast_period_days: forecast_days,
        historical_analysis: HistoricalAnalysis {
            data_period_days: FORECAST_HISTORY_DAYS,
            average_weekly_revenue: round2(average),
            trend_per_week: round2(trend),
            total_weeks_analyzed: revenues.len(),
        },
        forecast: Projection {
            total_projected_revenue: round2(total),
            weekly_projections,
        },
        methodology: "Linear trend analysis based on 90-day historical data",
        disclaimer: "Forecasts are estimates based on historical trends and should be used for planning purposes only",
    })
}

// =============================================================================
// Product profitability
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductProfit {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: Decimal,
    pub units_sold: i64,
    pub total_revenue: f64,
    pub estimated_cogs: f64,
    pub gross_profit: f64,
    pub profit_margin_percent: f64,
    pub revenue_per_unit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitabilitySummary {
    pub most_profitable_product: Option<String>,
    pub highest_margin_product: Option<String>,
    pub total_gross_profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductProfitabilityReport {
    pub analysis_period_days: i64,
    pub products_analyzed: usize,
    pub profitability_ranking: Vec<ProductProfit>,
    pub summary: ProfitabilitySummary,
}

/// Per-product gross profit for products sold in the window, best first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn product_profitability(
    products: &[Product],
    purchases: &[Purchase],
    costs: &CostAssumptions,
    days: i64,
) -> ProductProfitabilityReport {
    let mut sales: HashMap<ProductId, (f64, i64)> = HashMap::new();
    for purchase in purchases {
        let entry = sales.entry(purchase.product_id).or_insert((0.0, 0));
        entry.0 += purchase.amount();
        entry.1 += i64::from(purchase.quantity);
    }

    let mut ranking: Vec<ProductProfit> = products
        .iter()
        .filter_map(|product| {
            let &(revenue, units) = sales.get(&product.id)?;
            let cogs = revenue * costs.cogs_percentage;
            let gross = revenue - cogs;
            Some(ProductProfit {
                product_id: product.id,
                product_name: product.name.clone(),
                category: product.category.clone(),
                brand: product.brand.clone(),
                price: product.price,
                units_sold: units,
                total_revenue: round2(revenue),
                estimated_cogs: round2(cogs),
                gross_profit: round2(gross),
                profit_margin_percent: round2(percent(gross, revenue)),
                revenue_per_unit: round2(ratio(revenue, units as f64)),
            })
        })
        .collect();
    ranking.sort_by(|a, b| b.gross_profit.total_cmp(&a.gross_profit));

    let summary = ProfitabilitySummary {
        most_profitable_product: ranking.first().map(|p| p.product_name.clone()),
        highest_margin_product: arg_max(
            ranking
                .iter()
                .map(|p| (p.product_name.clone(), p.profit_margin_percent)),
        ),
        total_gross_profit: round2(ranking.iter().map(|p| p.gross_profit).sum()),
    };

    ProductProfitabilityReport {
        analysis_period_days: days,
        products_analyzed: ranking.len(),
        profitability_ranking: ranking,
        summary,
    }
}

// =============================================================================
// Cohorts
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CohortStats {
    pub users: usize,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub revenue_per_user: f64,
    pub orders_per_user: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortInsights {
    pub most_valuable_cohort: Option<String>,
    pub largest_cohort: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortRevenueReport {
    pub cohort_period: String,
    pub cohort_analysis: BTreeMap<String, CohortStats>,
    pub insights: CohortInsights,
}

/// Lifetime revenue of users grouped by registration month (`%Y-%m`).
#[must_use]
pub fn cohort_revenue(users: &[User], purchases: &[Purchase], period: &str) -> CohortRevenueReport {
    let mut spend: HashMap<UserId, (f64, usize)> = HashMap::new();
    for purchase in purchases {
        let entry = spend.entry(purchase.user_id).or_insert((0.0, 0));
        entry.0 += purchase.amount();
        entry.1 += 1;
    }

    let mut grouped: BTreeMap<String, (usize, f64, usize)> = BTreeMap::new();
    for user in users {
        let (revenue, orders) = spend.get(&user.id).copied().unwrap_or((0.0, 0));
        let entry = grouped
            .entry(user.registration_date.format("%Y-%m").to_string())
            .or_insert((0, 0.0, 0));
        entry.0 += 1;
        entry.1 += revenue;
        entry.2 += orders;
    }

    let cohorts: BTreeMap<String, CohortStats> = grouped
        .into_iter()
        .map(|(month, (members, revenue, orders))| {
            (
                month,
                CohortStats {
                    users: members,
                    total_revenue: round2(revenue),
                    total_orders: orders,
                    revenue_per_user: round2(ratio(revenue, count(members))),
                    orders_per_user: round2(ratio(count(orders), count(members))),
                },
            )
        })
        .collect();

    CohortRevenueReport {
        cohort_period: period.to_string(),
        insights: CohortInsights {
            most_valuable_cohort: arg_max(
                cohorts.iter().map(|(m, s)| (m.clone(), s.revenue_per_user)),
            ),
            largest_cohort: arg_max(cohorts.iter().map(|(m, s)| (m.clone(), count(s.users)))),
        },
        cohort_analysis: cohorts,
    }
}

// =============================================================================
// Discounts
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiscountAnalysis {
    pub total_orders: usize,
    pub discounted_orders: usize,
    pub full_price_orders: usize,
    pub discount_adoption_rate: f64,
    pub average_discount_percentage: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiscountImpact {
    pub total_discount_amount: f64,
    pub discounted_revenue: f64,
    pub full_price_revenue: f64,
    pub revenue_impact_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscountReport {
    pub analysis_period_days: i64,
    pub discount_analysis: DiscountAnalysis,
    pub financial_impact: DiscountImpact,
}

/// Discounted versus full-price orders; `None` when there are no purchases.
///
/// The discount amount of an order is its paid total times its discount
/// share.
#[must_use]
pub fn discount_impact(purchases: &[Purchase], days: i64) -> Option<DiscountReport> {
    if purchases.is_empty() {
        return None;
    }

    let (discounted, full_price): (Vec<&Purchase>, Vec<&Purchase>) =
        purchases.iter().partition(|p| p.is_discounted());

    let discount_amount: f64 = discounted
        .iter()
        .map(|p| p.amount() * p.discount_applied)
        .sum();
    let discounted_revenue = revenue_of(discounted.iter().copied());
    let full_price_revenue = revenue_of(full_price.iter().copied());
    let average_discount = ratio(
        discounted.iter().map(|p| p.discount_applied).sum(),
        count(discounted.len()),
    ) * 100.0;

    Some(DiscountReport {
        analysis_period_days: days,
        discount_analysis: DiscountAnalysis {
            total_orders: purchases.len(),
            discounted_orders: discounted.len(),
            full_price_orders: full_price.len(),
            discount_adoption_rate: round2(percent(
                count(discounted.len()),
                count(purchases.len()),
            )),
            average_discount_percentage: round2(average_discount),
        },
        financial_impact: DiscountImpact {
            total_discount_amount: round2(discount_amount),
            discounted_revenue: round2(discounted_revenue),
            full_price_revenue: round2(full_price_revenue),
            revenue_impact_percentage: round2(percent(
                discount_amount,
                discounted_revenue + full_price_revenue,
            )),
        },
    })
}

// =============================================================================
// Executive summary
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeyMetrics {
    pub total_revenue: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub average_order_value: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub report_period_days: i64,
    pub generated_at: DateTime<Utc>,
    pub key_metrics: KeyMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedReports {
    pub revenue_analysis: RevenueReport,
    pub profitability_analysis: ProfitReport,
    pub key_performance_indicators: KpiReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub executive_summary: ExecutiveSummary,
    pub detailed_reports: DetailedReports,
}

/// Combine the revenue, profit and KPI reports of one window.
#[must_use]
pub fn financial_summary(
    revenue: RevenueReport,
    profit: ProfitReport,
    kpis: KpiReport,
    now: DateTime<Utc>,
    days: i64,
) -> FinancialSummary {
    FinancialSummary {
        executive_summary: ExecutiveSummary {
            report_period_days: days,
            generated_at: now,
            key_metrics: KeyMetrics {
                total_revenue: revenue.revenue_summary.total_revenue,
                gross_profit: profit.profit_analysis.gross_profit,
                net_profit: profit.profit_analysis.net_profit,
                profit_margin: profit.margin_analysis.gross_margin_percent,
                average_order_value: kpis.revenue_kpis.average_order_value,
                conversion_rate: kpis.customer_kpis.conversion_rate,
            },
        },
        detailed_reports: DetailedReports {
            revenue_analysis: revenue,
            profitability_analysis: profit,
            key_performance_indicators: kpis,
        },
    }
}
