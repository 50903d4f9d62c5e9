use color_eyre::Result;

fn main() -> Result<()> {
    clerk::run()
}
