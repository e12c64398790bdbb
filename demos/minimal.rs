use lgbk::{backend::rest::Server, Client, Config, ExperimentName};

fn main() {
    const EXPERIMENT: &str = "xpptut15";
    let config = Config::new("https://pswww.example.org/ws-auth/").credentials("opr", "secret");
    let mut client = Server::new(config);
    let experiment = ExperimentName::from(EXPERIMENT);

    let info = client
        .experiment_info(&experiment)
        .expect("Could not get the experiment details");
    println!("{}", info);

    match client.current_run(&experiment).expect("Could not get the current run") {
        Some(run) => println!("Current run is {}", run),
        None => println!("No run was started yet"),
    }
}
