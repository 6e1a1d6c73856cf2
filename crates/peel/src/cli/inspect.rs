use peel_convert::Converter;

use super::app::InspectArg;
use super::register;

pub fn run(arg: InspectArg) -> anyhow::Result<()> {
    let mut converter = Converter::default();
    register(&mut converter, &arg.inputs)?;

    println!("{:<8}{:>14}  {}", "KIND", "SIZE", "INPUT");
    for record in converter.inputs() {
        println!("{record}");
    }
    Ok(())
}
