fn main() -> anyhow::Result<()> {
    anicap::run()?;
    Ok(())
}
