use recommerce_gym::market::Action;
use recommerce_gym::vendors::{StorageThreshold, Vendor};
use recommerce_gym::wrappers::Watched;
use recommerce_gym::{Config, Economy, Env, Scenario, SimMarket, SyncVectorEnv, Watcher};

fn duopoly(config: &Config) -> SimMarket {
    SimMarket::new(Scenario::CircularDuopoly, config.clone()).expect("valid config")
}

// A vector env with N=1 produces the same rollout as a single env seeded
// with the derived sub-seed.
#[test]
fn single_vs_vector_n1_same_rollout() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = Config { episode_length: 10, ..Config::default() };
    let sub_seed = recommerce_gym::utils::split_n(5, 1)[0];

    let mut single = duopoly(&config);
    let mut vector = SyncVectorEnv::from_envs(vec![duopoly(&config)]);
    let first = single.reset(Some(sub_seed)).expect("reset");
    assert_eq!(vector.reset_all(Some(5)).expect("reset"), vec![first]);

    for prices in [(2, 5), (3, 6), (1, 4), (4, 9), (0, 7)] {
        let s_single = single.step(Action::from(prices)).expect("valid action");
        let s_vec = vector.step_all(vec![Action::from(prices)]).expect("valid action").remove(0);
        assert_eq!(s_single, s_vec);
    }
}

// Several envs feeding one watcher under their own index
#[test]
fn vector_envs_share_one_watcher() {
    let config = Config { episode_length: 4, ..Config::default() };
    let number_envs = 3;
    let mut vector = SyncVectorEnv::new(number_envs, |_| Ok(duopoly(&config))).expect("valid markets");
    let mut watcher = Watcher::from_config(&config, number_envs);
    let mut agents: Vec<StorageThreshold> =
        (0..number_envs).map(|_| StorageThreshold::new(&config, Economy::Circular)).collect();

    let mut observations = vector.reset_all(Some(1)).expect("reset");
    for _ in 0..2 * config.episode_length {
        let actions = agents
            .iter_mut()
            .zip(&observations)
            .map(|(agent, observation)| agent.policy(observation))
            .collect::<recommerce_gym::Result<Vec<_>>>()
            .expect("rule-based actions");
        let steps = vector.step_all(actions).expect("valid actions");
        let mut next = Vec::with_capacity(number_envs);
        for (index, step) in steps.into_iter().enumerate() {
            watcher.add_info(&step.info, index).expect("valid index");
            next.push(step.observation);
        }
        if vector.envs().iter().all(|env| env.state().step_counter == config.episode_length) {
            observations = vector.reset_all(None).expect("reset");
        } else {
            observations = next;
        }
    }

    assert_eq!(watcher.all_dicts().len(), 2 * number_envs);
    assert_eq!(watcher.get_number_of_vendors(), Some(2));
    let incoming = watcher.get_all_samples_of_property("customer/incoming", None).expect("recorded");
    assert!(incoming.iter().all(|&customers| customers == 80.0));
    let average = watcher.get_average_dict(100).expect("same shapes");
    assert!(average.lookup("profits/all/vendor_1").is_some());
}

#[test]
fn watched_market_progress_values() {
    let config = Config { episode_length: 5, ..Config::default() };
    let mut env = Watched::new(duopoly(&config), Watcher::from_config(&config, 1));
    let mut agent = StorageThreshold::new(&config, Economy::Circular);
    for episode in 0..3 {
        let mut observation = env.reset(Some(episode)).expect("reset");
        loop {
            let step = env.step(agent.policy(&observation).expect("rule-based action")).expect("valid action");
            observation = step.observation;
            if step.done {
                break;
            }
        }
    }
    let watcher = env.watcher();
    let storage = watcher.get_progress_values_of_property("state/in_storage", Some(0), 100).expect("recorded");
    assert_eq!(storage.len(), 3);
    assert!(storage.iter().all(|&level| (0.0..=f64::from(config.max_storage)).contains(&level)));
    let cumulative = watcher.get_cumulative_properties().expect("recorded");
    assert!(cumulative.contains_key("profits/all"));
    assert!(!cumulative.contains_key("state/in_circulation"));
}
