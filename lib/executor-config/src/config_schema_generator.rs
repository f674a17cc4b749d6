use std::io::Write;

use plan_executor_config::ExecutorConfig;
use schemars::generate::SchemaSettings;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let generator = SchemaSettings::draft2020_12()
        .with(|s| {
            s.inline_subschemas = true;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<ExecutorConfig>();
    let schema_str = serde_json::to_string_pretty(&schema)?;
    let args = std::env::args().collect::<Vec<String>>();

    match args.get(1) {
        Some(output_file) => {
            let mut file = std::fs::File::create(output_file)?;
            file.write_all(schema_str.as_bytes())?;

            println!("JSON Schema written to {}", output_file);
        }
        None => {
            println!("{}", schema_str);
        }
    }
    Ok(())
}
