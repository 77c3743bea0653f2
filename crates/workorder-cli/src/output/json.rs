use workorder_core::error::WorkOrderError;
use workorder_core::model::WorkOrder;

pub fn print(work_order: &WorkOrder) -> Result<(), WorkOrderError> {
    let json = serde_json::to_string_pretty(work_order)?;
    println!("{json}");
    Ok(())
}
