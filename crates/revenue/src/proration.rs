use salesbook_core::money::prorate;
use salesbook_invoicing::{InvoiceLineRecord, ScheduleRowId};

/// COGS attributed to one schedule row, prorated against its frozen line.
///
/// Rows whose line cannot be found attribute nothing. Both that and an
/// overpaid row are data-quality problems, logged and not raised.
pub fn prorated_cogs(
    row_id: ScheduleRowId,
    amount_minor: u64,
    line: Option<&InvoiceLineRecord>,
) -> u64 {
    let Some(line) = line else {
        tracing::warn!(row_id = %row_id, amount_minor, "schedule row references unknown invoice line; no cogs attributed");
        return 0;
    };

    let share = prorate(line.cogs_minor, amount_minor, line.total_minor);
    if share.saturated {
        tracing::warn!(
            row_id = %row_id,
            invoice_line_id = %line.id,
            amount_minor,
            line_total_minor = line.total_minor,
            "schedule row exceeds its line total; cogs ratio clamped to 1"
        );
    }
    share.amount
}
