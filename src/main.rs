fn main() -> anyhow::Result<()> {
    moodlog_tui::cli::run()
}
