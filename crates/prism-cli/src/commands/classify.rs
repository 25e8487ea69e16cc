//! Classify command implementation.

use crate::cli::ClassifyArgs;
use crate::error::Result;
use crate::output::Formatter;
use prism_domain::classify;

/// Execute the classify command.
pub fn execute_classify(args: ClassifyArgs, formatter: &Formatter) -> Result<()> {
    let kind = classify(&args.input);
    println!("{}", formatter.format_classification(args.input.trim(), kind)?);
    Ok(())
}
