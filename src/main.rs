use clap::{App, Arg};
use encoding::label::encoding_from_whatwg_label;
use std::process;

use csvds::{CsvFileSource, CsvResolver, NameRow, Property};

fn run() -> Result<(), String> {
    let matches = App::new("csvds")
        .version("0.1")
        .about("Resolves a csv file into a typed table and prints it as JSON")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT")
                .help("Input file")
                .required(true),
        )
        .arg(
            Arg::with_name("name_row")
                .short("n")
                .long("name-row")
                .value_name("ROW")
                .help("Number of the row holding the column names, 0 for none")
                .default_value("1"),
        )
        .arg(
            Arg::with_name("encoding")
                .short("e")
                .long("encoding")
                .value_name("LABEL")
                .help("Encoding of the input file")
                .default_value("utf-8"),
        )
        .arg(
            Arg::with_name("property")
                .short("p")
                .long("property")
                .value_name("NAME:TYPE")
                .help("Declares a column, skipping type inference. TYPE is string or number")
                .multiple(true)
                .number_of_values(1),
        )
        .get_matches();

    let name_row: i64 = matches
        .value_of("name_row")
        .unwrap_or("1")
        .parse()
        .map_err(|_| "name row must be an integer".to_string())?;

    let label = matches.value_of("encoding").unwrap_or("utf-8");
    let encoding = encoding_from_whatwg_label(label)
        .ok_or_else(|| format!("unknown encoding: {}", label))?;

    let properties = match matches.values_of("property") {
        Some(specs) => specs
            .map(|spec| spec.parse::<Property>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?,
        None => Vec::new(),
    };

    // INPUT is required, clap already exited if it is missing
    let source = CsvFileSource::new(matches.value_of("input").unwrap_or_default())
        .with_encoding(encoding);

    let resolver = CsvResolver::new()
        .name_row(NameRow::new(name_row))
        .properties(properties);

    let result = if resolver.get_properties().is_empty() {
        resolver.resolve(&source)
    } else {
        resolver.result(&source)
    }
    .map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;

    println!("{}", json);

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("failed: {}", e);
        process::exit(1);
    }
}
