fn main() -> anyhow::Result<()> {
    contest_scrape_lib::run()
}
