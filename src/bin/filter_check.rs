fn main() {
    systemd_journal_logger::JournalLog::new()
        .unwrap()
        .with_syslog_identifier("flint-filter-check".to_string())
        .install()
        .unwrap();
    log::set_max_level(log::LevelFilter::Debug);

    let args: Vec<String> = std::env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let mut rest = args.iter().skip(1).filter(|a| *a != "--json");
    let Some(path) = rest.next() else {
        eprintln!("usage: filter_check <todo-file> [query] [--json]");
        std::process::exit(2);
    };
    let query = rest.next().map(String::as_str).unwrap_or("");

    // The same stored settings and filters the viewer would use.
    let data_dir = flint::config::default_data_dir();
    let settings = flint::config::Settings::load_or_default(&flint::config::config_path(&data_dir));
    let filters = flint::config::load_filters(&flint::config::filters_path(&data_dir));

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("cannot read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let outcome = flint::core::request::process_request(&content, &filters, query, &settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
        return;
    }

    println!("=== {} ===\n", path);
    println!(
        "Records: {} available, {} visible",
        outcome.headers.available, outcome.headers.visible
    );
    if !query.is_empty() {
        println!("Search: {:?}", query);
    }

    println!("\n--- Facets ---");
    for attribute in flint::core::task::Attribute::ALL {
        let bucket = outcome.facets.bucket(attribute);
        if bucket.is_empty() {
            continue;
        }
        let rendered: Vec<String> = bucket
            .iter()
            .map(|facet| format!("{} ({})", facet.value, facet.count))
            .collect();
        println!("  {}: {}", attribute, rendered.join(", "));
    }

    println!("\n--- Visible lines ---");
    for record in &outcome.records {
        println!("  {:>4}  {}", record.id, record.raw);
    }
    if outcome.records.is_empty() {
        if outcome.headers.available == 0 {
            println!("  (file has no tasks)");
        } else {
            println!("  (all {} records filtered away)", outcome.headers.available);
        }
    }

    println!("\n=== Done ===");
}
