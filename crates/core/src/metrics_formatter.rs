#![allow(clippy::format_push_string)]

use crate::results::AggregateResult;

pub struct SummaryFormatter;

impl SummaryFormatter {
    #[must_use]
    pub fn format(result: &AggregateResult) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(&format!(
            "--- RESULTS OVER {} ITERATIONS ---\n",
            result.iterations
        ));
        output.push_str(&format!(
            "Average Dirty Data Error: {:.4}%\n",
            result.mean_dirty_error
        ));
        output.push_str(&format!(
            "Average Clean Data Error: {:.4}%\n",
            result.mean_clean_error
        ));
        output.push_str(&format!(
            "Average Improvement:      {:.4} percentage points recovered\n",
            result.mean_improvement
        ));
        output.push_str(&format!(
            "Worst Case Improvement:   {:.4}%\n",
            result.min_improvement
        ));
        output.push_str(&format!(
            "Best Case Improvement:    {:.4}%\n",
            result.max_improvement
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_all_five_statistics() {
        let result = AggregateResult {
            iterations: 1000,
            mean_dirty_error: 0.51234,
            mean_clean_error: 0.01,
            mean_improvement: 0.50234,
            min_improvement: -0.1,
            max_improvement: 0.9,
        };

        let text = SummaryFormatter::format(&result);

        assert!(text.contains("--- RESULTS OVER 1000 ITERATIONS ---"));
        assert!(text.contains("Average Dirty Data Error: 0.5123%"));
        assert!(text.contains("Average Clean Data Error: 0.0100%"));
        assert!(text.contains("Average Improvement:      0.5023 percentage points recovered"));
        assert!(text.contains("Worst Case Improvement:   -0.1000%"));
        assert!(text.contains("Best Case Improvement:    0.9000%"));
    }

    #[test]
    fn formats_nan_without_panicking() {
        let text = SummaryFormatter::format(&AggregateResult::from_trials(&[]));
        assert!(text.contains("RESULTS OVER 0 ITERATIONS"));
        assert!(text.contains("NaN"));
    }
}
