//! Console rendering of stocks, group metrics and CAAR tables.

use crate::group::GroupMetrics;
use crate::stock::Stock;
use crate::types::{CaarTable, DayValue, SurpriseGroup};
use colored::Colorize;
use tabled::{builder::Builder, settings::Style};

/// Days shown on each side of the midpoint in stock reports.
pub const STOCK_WINDOW_RADIUS: usize = 5;

/// Which group metric to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Aar,
    Caar,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Aar => "AAR",
            Metric::Caar => "CAAR",
        }
    }
}

/// Formats study output for the terminal.
pub struct ReportFormatter;

impl ReportFormatter {
    fn heading(title: &str) -> String {
        format!("===== {} =====", title).bold().blue().to_string()
    }

    fn format_pct(value: f64, decimals: usize) -> String {
        let text = format!("{:.*}%", decimals, value * 100.0);
        if value >= 0.0 {
            text.green().to_string()
        } else if value < 0.0 {
            text.red().to_string()
        } else {
            text
        }
    }

    fn day_table(header: &str, points: &[DayValue], fmt: impl Fn(f64) -> String) -> String {
        let mut builder = Builder::new();
        builder.push_record(["Day", header]);
        for point in points {
            builder.push_record([point.day.to_string(), fmt(point.value)]);
        }
        builder.build().with(Style::rounded()).to_string()
    }

    /// Stock details with price and abnormal-return windows.
    pub fn render_stock(stock: &Stock) -> String {
        let mut out = String::new();
        out.push_str(&Self::heading("Stock Information"));
        out.push('\n');
        out.push_str(&format!("Symbol:        {}\n", stock.symbol()));
        out.push_str(&format!("EPS Estimate:  {}\n", stock.eps_estimate()));
        out.push_str(&format!("Actual EPS:    {}\n", stock.actual_eps()));
        out.push_str(&format!("Surprise:      {:.2}%\n", stock.surprise_pct()));
        out.push_str(&format!("Group:         {}\n", stock.group()));
        out.push_str(&format!("Earnings Date: {}\n", stock.earnings_date()));

        if !stock.has_market_data() {
            out.push_str(&"\nNo market data loaded.\n".yellow().to_string());
            return out;
        }

        out.push_str("\nPrices around earnings date:\n");
        out.push_str(&Self::day_table(
            "Price",
            &stock.price_window(STOCK_WINDOW_RADIUS),
            |v| format!("${:.2}", v),
        ));
        out.push_str("\n\nAbnormal returns around earnings date:\n");
        out.push_str(&Self::day_table(
            "Abnormal Return",
            &stock.abnormal_window(STOCK_WINDOW_RADIUS),
            |v| Self::format_pct(v, 4),
        ));
        out.push('\n');
        out
    }

    pub fn print_stock(stock: &Stock) {
        println!("{}", Self::render_stock(stock));
    }

    /// AAR or CAAR of one group, one row per event day.
    pub fn render_group_metrics(
        group: SurpriseGroup,
        members: usize,
        metrics: &GroupMetrics,
        metric: Metric,
        anchor_offset: i64,
    ) -> String {
        let points = match metric {
            Metric::Aar => metrics.aar_by_day(anchor_offset),
            Metric::Caar => metrics.caar_by_day(anchor_offset),
        };

        let mut out = Self::heading(&format!("{} Group {}", group, metric.label()));
        out.push_str(&format!("\nNumber of stocks: {}\n\n", members));
        out.push_str(&Self::day_table(metric.label(), &points, |v| Self::format_pct(v, 6)));
        out.push('\n');
        out
    }

    pub fn print_group_metrics(
        group: SurpriseGroup,
        members: usize,
        metrics: &GroupMetrics,
        metric: Metric,
        anchor_offset: i64,
    ) {
        println!(
            "{}",
            Self::render_group_metrics(group, members, metrics, metric, anchor_offset)
        );
    }

    /// Three-column CAAR table.
    pub fn render_caar_table(title: &str, table: &CaarTable) -> String {
        let mut builder = Builder::new();
        builder.push_record(["Day", "Beat", "Meet", "Miss"]);
        for row in table.rows() {
            let cell = |v: Option<f64>| v.map(|v| format!("{:.4}%", v * 100.0)).unwrap_or_default();
            builder.push_record([
                row.day.to_string(),
                cell(row.beat),
                cell(row.meet),
                cell(row.miss),
            ]);
        }

        format!(
            "{}\n{}\n",
            Self::heading(title),
            builder.build().with(Style::rounded())
        )
    }

    pub fn print_caar_table(title: &str, table: &CaarTable) {
        println!("{}", Self::render_caar_table(title, table));
    }
}
