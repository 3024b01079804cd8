use crate::app::error::Result;
use crate::app::gosyntax;
use crate::app::models::ImportEntry;

pub struct OutputGenerator;

impl OutputGenerator {
    /// Raw source: the package clause and one blank import per entry, in order.
    pub fn generate_source(package_name: &str, entries: &[ImportEntry]) -> String {
        let mut output = format!("package {}\n", package_name);

        for entry in entries {
            output.push_str(&format!("import _ \"{}\"\n", entry.import_path));
        }

        output
    }

    /// Canonicalizes generated source the way gofmt lays it out.
    pub fn format_source(source: &str) -> Result<String> {
        let file = gosyntax::parse_file(source)?;
        Ok(file.print())
    }
}
