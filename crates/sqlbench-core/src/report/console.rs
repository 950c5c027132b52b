use crate::engine::pool::CombinationReport;
use crate::model::BucketSummary;

/// `"1h 2m 3.40s"`, dropping leading zero units.
pub fn format_elapsed(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u64;
    let minutes = ((total_secs % 3600.0) / 60.0).floor() as u64;
    let secs = total_secs % 60.0;
    if hours > 0 {
        format!("{}h {}m {:.2}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {:.2}s", minutes, secs)
    } else {
        format!("{:.2}s", secs)
    }
}

pub fn print_bucket_summary(s: &BucketSummary) {
    eprintln!(
        "Results ({} records): sql={} no_sql={} error={}",
        s.total(),
        s.sql,
        s.no_sql,
        s.errors
    );
}

pub fn print_run_summary(reports: &[CombinationReport]) {
    let mut ok = 0;
    let mut failed = 0;
    let mut sql = 0;
    let mut no_sql = 0;
    let mut errors = 0;

    for r in reports {
        match &r.result {
            Ok(buckets) => {
                ok += 1;
                for b in buckets {
                    sql += b.sql;
                    no_sql += b.no_sql;
                    errors += b.errors;
                }
            }
            Err(msg) => {
                failed += 1;
                eprintln!("FAILED [{}]: {}", r.combination.label(), msg);
            }
        }
    }

    eprintln!(
        "Combinations: ok={} failed={} | queries: sql={} no_sql={} error={}",
        ok, failed, sql, no_sql, errors
    );
}
