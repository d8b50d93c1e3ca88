/// Quickstart example - the simplest possible usage
use gavel::flatten::{ExtractWriter, FlattenConfig, FlushPolicy, Relation, RowExtractor};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Gavel Quick Start ===\n");

    // Step 1: One auction item as it appears in a dump file
    let items = vec![json!({
        "ItemID": "100",
        "Name": "First edition",
        "Currently": "$12.50",
        "Number_of_Bids": "1",
        "Started": "Dec-05-01 10:00:00",
        "Ends": "Dec-17-01 12:00:00",
        "Location": "Palo Alto",
        "Country": "USA",
        "Seller": {"UserID": "s1", "Rating": "42"},
        "Category": ["Books", "Rare"],
        "Bids": [
            {"Bid": {
                "Bidder": {"UserID": "u1", "Rating": "3"},
                "Amount": "$10.00",
                "Time": "Jan-01-99 00:00:01"
            }}
        ]
    })];

    println!("Original item:");
    println!("{}\n", serde_json::to_string_pretty(&items[0])?);

    // Step 2: Create an extractor
    let extractor = RowExtractor::new(FlattenConfig::default());

    // Step 3: Flatten the item into relation rows
    let document = extractor.extract_document(&items);

    println!("Extracted {} rows:\n", document.rows.counts().total());
    for relation in Relation::ALL {
        for row in document.rows.rows(relation) {
            println!("  {:16} {}", relation.file_name(), row);
        }
    }

    // Step 4: Write the four .dat files
    println!("\nWriting the load files...");
    let mut writer = ExtractWriter::create(".", FlushPolicy::Buffered, false)?;
    writer.write_document(document.rows)?;
    writer.finish()?;

    println!("\n✓ Done! Created files:");
    println!("  • items.dat       - one row per item");
    println!("  • users.dat       - seller and bidder observations");
    println!("  • bids.dat        - one row per bid");
    println!("  • categories.dat  - one row per category membership");

    println!("\nTry these commands:");
    println!("  cat items.dat");
    println!("  cat users.dat");

    Ok(())
}
