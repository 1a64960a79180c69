fn main() -> anyhow::Result<()> {
    resto_admin_lib::run()
}
