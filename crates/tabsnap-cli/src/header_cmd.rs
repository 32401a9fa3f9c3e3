use std::collections::BTreeMap;
use std::path::Path;

use tabsnap::parse_header_lines;

use crate::shared::{load_string_map, read_file};

pub fn run(file: &Path, key_map_path: Option<&Path>) -> Result<(), i32> {
    let text = read_file(file)?;
    let key_map = match key_map_path {
        Some(path) => load_string_map(path)?,
        None => BTreeMap::new(),
    };

    let header = parse_header_lines(&text, &key_map);
    let json = serde_json::to_string_pretty(&header).expect("header serializes");
    println!("{json}");
    Ok(())
}
