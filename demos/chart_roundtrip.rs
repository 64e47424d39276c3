/// Example demonstrating how to read, update and copy the charts of a .docx
/// file using the longan chart engine.
///
/// This example shows:
/// - Loading a package into memory
/// - Listing every chart with its categories and series
/// - Replacing the data of one chart (chart cache and embedded workbook)
/// - Duplicating that chart right below the original
///
/// Usage: chart_roundtrip <input.docx> <output.docx> [chart-index]
use longan::ooxml::charts::{ChartData, Series};
use longan::ooxml::docx::ChartEditor;
use longan::ooxml::opc::MemPackage;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input.docx> <output.docx> [chart-index]", args[0]);
        eprintln!("\nExample: {} report.docx report-updated.docx 1", args[0]);
        std::process::exit(1);
    }
    let index: u32 = match args.get(3) {
        Some(arg) => arg.parse()?,
        None => 1,
    };

    println!("Opening package: {}", args[1]);
    println!("{}", "=".repeat(60));
    let bytes = std::fs::read(&args[1])?;
    let mut editor = ChartEditor::new(MemPackage::from_zip(&bytes)?);

    println!("\nCharts:");
    for chart in editor.chart_indices()? {
        match editor.chart_data(chart) {
            Ok(view) => {
                println!("   chart{}: {:?} \"{}\"", chart, view.kind, view.title);
                println!("      Categories: {:?}", view.categories.labels());
                for series in &view.series {
                    println!("      {}: {:?}", series.name, series.values);
                }
                if let Some(sheet) = &view.sheet_name {
                    println!("      Sheet: {}", sheet);
                }
            },
            Err(e) => eprintln!("   chart{}: {}", chart, e),
        }
    }

    let data = ChartData::new(
        ["Device A", "Device B", "Device C"],
        vec![
            Series::new("Critical", vec![4.0, 3.0, 2.0]),
            Series::new("Non-critical", vec![8.0, 7.0, 6.0]),
        ],
    )
    .with_title("Findings by device");

    println!("\nUpdating chart{}...", index);
    let report = editor.update_chart(index, &data)?;
    println!(
        "   {} series written ({} replaced), workbook synced: {}",
        report.series_written, report.series_replaced, report.workbook_synced
    );
    println!("   Title: {:?}", report.title);

    let copy = editor.copy_chart(index)?;
    println!("\nCopied chart{} to chart{}", index, copy);
    println!("   Workbook: {}", editor.resolve_workbook(copy)?);

    std::fs::write(&args[2], editor.into_inner().to_zip()?)?;
    println!("\nWrote {}", args[2]);
    Ok(())
}
