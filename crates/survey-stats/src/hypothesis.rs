/// Outcome of a hypothesis test.
///
/// `degrees_of_freedom` is only reported for chi-square tests of
/// independence, where it depends on the table shape.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degrees_of_freedom: Option<usize>,
}

impl TestResult {
    #[must_use]
    pub fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value,
            degrees_of_freedom: None,
        }
    }

    #[must_use]
    pub fn with_degrees_of_freedom(mut self, df: usize) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }

    /// Whether the null hypothesis is rejected at significance level `alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}
