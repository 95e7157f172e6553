fn main() -> anyhow::Result<()> {
    task_manager_lib::run()
}
