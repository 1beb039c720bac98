fn main() -> anyhow::Result<()> {
    stagehand::run()
}
