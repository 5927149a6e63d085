//! Tabular exports of binned marginals and their summaries.

use crate::error::Result;
use crate::processing::credible::SigmaLevel;
use crate::processing::marginal::Marginal;
use crate::processing::statistics::MarginalSummary;

/// One row per bin with its edges, centre, raw and normalized count and band
/// membership.
pub fn histogram_csv(marginal: &Marginal) -> Result<String> {
    let hist = &marginal.histogram;
    let centers = hist.centers();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "parameter",
        "bin_left",
        "bin_right",
        "bin_center",
        "count",
        "height",
        "in_1sigma",
        "in_2sigma",
    ])?;

    for i in 0..hist.len() {
        let in_band = |level| marginal.span(level).is_some_and(|s| s.contains(i));
        writer.write_record([
            marginal.name.clone(),
            hist.edges[i].to_string(),
            hist.edges[i + 1].to_string(),
            centers[i].to_string(),
            hist.counts[i].to_string(),
            marginal.heights[i].to_string(),
            in_band(SigmaLevel::One).to_string(),
            in_band(SigmaLevel::Two).to_string(),
        ])?;
    }

    finish(writer)
}

pub fn summary_csv(summaries: &[MarginalSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "parameter", "samples", "mean", "median", "std_dev", "min", "max", "sigma1_low",
        "sigma1_high", "sigma2_low", "sigma2_high",
    ])?;
    for s in summaries {
        writer.write_record([
            s.name.clone(),
            s.count.to_string(),
            s.mean.to_string(),
            s.median.to_string(),
            s.std_dev.to_string(),
            s.min.to_string(),
            s.max.to_string(),
            s.sigma_1.low.to_string(),
            s.sigma_1.high.to_string(),
            s.sigma_2.low.to_string(),
            s.sigma_2.high.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn summary_json(summaries: &[MarginalSummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(summaries)?)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_histogram_csv_rows() {
        let m = Marginal::compute("alpha", &uniform(1001), 10).unwrap();
        let text = histogram_csv(&m).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("parameter,bin_left"));
        assert!(lines[0].starts_with("parameter,bin_left,bin_right,bin_center,count"));
        assert!(lines[1].starts_with("alpha,0,0.1,0.05,"));
        // bin 0 is outside both bands, bin 5 is inside both
        assert!(lines[1].ends_with("false,false"));
        assert!(lines[6].ends_with("true,true"));
    }

    #[test]
    fn test_summary_exports() {
        let s = MarginalSummary::compute("beta", &[1.0, 2.0, 3.0]).unwrap();
        let csv_text = summary_csv(std::slice::from_ref(&s)).unwrap();
        assert_eq!(csv_text.lines().count(), 2);
        assert!(csv_text.lines().nth(1).unwrap().starts_with("beta,3,2,2,"));

        let json = summary_json(&[s]).unwrap();
        let parsed: Vec<MarginalSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0].name, "beta");
        assert_eq!(parsed[0].sigma_1.level, SigmaLevel::One);
    }
}
