//! CLI command handlers, one per file.

mod decode_next;
mod read;
mod simulate;

pub use decode_next::run_decode_next;
pub use read::{run_read, ReadArgs};
pub use simulate::{run_simulate, SimulateArgs};

use crate::host::DeliveryReport;

pub(crate) fn print_report(report: &DeliveryReport) {
    let p = &report.progress;
    println!();
    println!(
        "{} of {} pages delivered, {} failed, {} fetches in {:.1}s",
        p.loaded,
        p.total,
        p.failed,
        report.page_fetches,
        report.elapsed.as_secs_f64()
    );
    if p.fully_delivered {
        println!("chapter fully delivered");
    }
    if report.prefetch_issued > 0 {
        println!(
            "next chapter: {} page(s) prefetched, {} failed",
            report.prefetch_issued, report.prefetch_failed
        );
    }
}
