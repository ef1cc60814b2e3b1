use recommerce_gym::registry::{make, make_vendor};
use recommerce_gym::wrappers::Watched;
use recommerce_gym::{Config, Env, Scenario, Vendor, Watcher};

// Plays a few episodes of every scenario with a rule-based agent and prints
// the averaged statistics. Set RUST_LOG=debug to see episode boundaries.
fn main() -> recommerce_gym::Result<()> {
    env_logger::init();

    let config = Config::default();
    let episodes: u64 = 5;
    for scenario in [Scenario::LinearDuopoly, Scenario::CircularDuopoly, Scenario::CircularRebuyDuopoly] {
        let market = make(scenario.to_string(), config.clone())?;
        let agent_id = if scenario.economy().is_circular() { "storage-threshold" } else { "linear-ratio" };
        let mut agent = make_vendor(agent_id, &config, scenario.economy())?;
        let mut env = Watched::new(market, Watcher::from_config(&config, 1));

        for episode in 0..episodes {
            let mut observation = env.reset(Some(episode))?;
            loop {
                let step = env.step(agent.policy(&observation)?)?;
                observation = step.observation;
                if step.done {
                    break;
                }
            }
        }

        let watcher = env.watcher();
        let average = watcher.get_average_dict(100)?;
        println!("{scenario} with {agent_id} over {episodes} episodes:");
        for (name, value) in average.iter() {
            println!("  {name:<40} {value:?}");
        }
        let profits = watcher.get_all_samples_of_property("profits/all", Some(0))?;
        println!("  agent profit per episode: {profits:.1?}");
    }
    Ok(())
}
