use anyhow::Result;
use lgbk::{api::run::ParamDescriptions, logging, Config, Session, Target};

struct Args {
    config: Option<String>,
    url: Option<String>,
    uid: String,
    password: String,
    experiment: Option<String>,
    instrument: String,
    station: u32,
    run_type: Option<String>,
    verbose: bool,
    detectors: Vec<String>,
}

impl Args {
    pub fn from_env() -> Result<Self> {
        let mut args = pico_args::Arguments::from_env();
        Ok(Args {
            config: args.opt_value_from_str(["-c", "--config"])?,
            url: args.opt_value_from_str(["-u", "--url"])?,
            uid: args.opt_value_from_str("--uid")?.unwrap_or_default(),
            password: args.opt_value_from_str("--password")?.unwrap_or_default(),
            experiment: args.opt_value_from_str(["-e", "--experiment"])?,
            instrument: args.opt_value_from_str(["-i", "--instrument"])?.unwrap_or_default(),
            station: args.opt_value_from_str(["-s", "--station"])?.unwrap_or(0),
            run_type: args.opt_value_from_str(["-t", "--run-type"])?,
            verbose: args.contains(["-v", "--verbose"]),
            detectors: args.free()?,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::from_env()?;
    logging::init(args.verbose)?;

    let target = match args.experiment {
        Some(experiment) => Target::experiment(experiment),
        None => Target::station(args.instrument, args.station),
    };
    let mut session = match (args.config, args.url) {
        (Some(path), _) => Session::from_config_file(path, target)?,
        (None, Some(url)) => {
            let config = Config::new(url)
                .credentials(args.uid, args.password)
                .verbose(args.verbose);
            Session::connect(config, target)?
        }
        (None, None) => anyhow::bail!("either --config or --url is required"),
    };
    println!("Experiment details: {}", session.info());

    let run = session.start_run(args.run_type.as_deref())?;
    println!("Started run {}", run);

    session.report_detectors(&args.detectors)?;
    let mut descriptions = ParamDescriptions::new();
    for detector in &args.detectors {
        descriptions.insert(
            format!("DAQ Detectors/{}", detector),
            format!("{} was part of the run", detector),
        );
    }
    session.add_update_run_param_descriptions(&descriptions)?;
    session.report_totals(0, 0, 0.0)?;

    let run = session.end_run()?;
    println!("Ended run {}", run);
    Ok(())
}
