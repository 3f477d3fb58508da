//! Daily return and abnormal-return series.
//!
//! Both functions are pure. A zero price produces a non-finite return which is
//! passed through unchanged; nothing here clamps or substitutes values.

/// Simple daily returns of a chronological price series.
///
/// `returns[i] = (prices[i + 1] - prices[i]) / prices[i]`, so the output is
/// one element shorter than the input (empty for fewer than two prices).
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Stock returns minus benchmark returns, index-aligned.
///
/// The result is truncated to the shorter of the two inputs.
pub fn abnormal_returns(stock_returns: &[f64], benchmark_returns: &[f64]) -> Vec<f64> {
    stock_returns
        .iter()
        .zip(benchmark_returns)
        .map(|(s, b)| s - b)
        .collect()
}
