use vergen::EmitBuilder;

// Emits VERGEN_BUILD_* variables used in the startup log line.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder().all_build().emit()?;
    Ok(())
}
