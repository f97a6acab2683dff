use datamask_core::{Context, Datasource, EnumeratedDatasource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pair = EnumeratedDatasource::from_values("pair", Vec::<String>::new())
        .with_rules(["[10,99]"])?;
    let phone = EnumeratedDatasource::from_values("phone", Vec::<String>::new())
        .with_rules(["+33 6 {{pair}} {{pair}} {{pair}} {{pair}}", "+33 7 [10000000,99999999]"])?;

    let sources: Vec<Box<dyn Datasource>> = vec![Box::new(pair), Box::new(phone)];
    let context = Context::new(sources)?;

    for _ in 0..5 {
        println!("{}", context.sample("phone")?);
    }
    Ok(())
}
