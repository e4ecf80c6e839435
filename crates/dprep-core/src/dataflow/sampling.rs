//! Muestreo y particionado aleatorio.

use rand::Rng;

use super::Dataflow;
use crate::args;
use crate::columns::{selection_to_value, MultiColumnSelection};
use crate::errors::DataflowError;
use crate::reference::{resolve, DataflowReference};
use crate::step::StepType;
use crate::value::Value;

/// Semilla explícita o una nueva aleatoria en `[0, u32::MAX]`.
fn seed_or_random(seed: Option<u32>) -> u32 {
    seed.unwrap_or_else(|| rand::rng().random::<u32>())
}

fn check_probability(argument: &str, p: f64) -> Result<(), DataflowError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(DataflowError::invalid(argument, format!("{p} is not in [0, 1]")))
    }
}

/// `{tag: valor}` para un valor de estrato; las fechas viajan en ticks.
fn stratum_value(value: &Value) -> Result<Value, DataflowError> {
    let payload = match value {
        Value::String(_) | Value::Long(_) | Value::Double(_) | Value::Boolean(_) => value.clone(),
        Value::DateTime(ts) => Value::Long(ts.ticks()),
        other => {
            return Err(DataflowError::unsupported("fractions", format!("{} can't be used as a stratum value", other.kind())))
        }
    };
    let mut tagged = args! {};
    tagged.insert(value.kind().tag().to_string(), payload);
    Ok(Value::Record(tagged))
}

impl Dataflow {
    /// Cada registro entra en la muestra con probabilidad `probability`.
    pub fn take_sample(&self, probability: f64, seed: Option<u32>) -> Result<Dataflow, DataflowError> {
        check_probability("probability", probability)?;
        self.add_step(StepType::TakeSample,
                      args! { "probability" => probability, "seed" => seed_or_random(seed) })
    }

    /// Muestra estratificada. `fractions` asocia cada combinación de valores
    /// de `columns` (en el mismo orden) con su peso.
    pub fn take_stratified_sample(&self,
                                  columns: impl Into<MultiColumnSelection>,
                                  fractions: &[(Vec<Value>, i64)],
                                  seed: Option<u32>)
                                  -> Result<Dataflow, DataflowError> {
        let mut encoded = Vec::with_capacity(fractions.len());
        for (stratum, weight) in fractions {
            let stratum = stratum.iter().map(stratum_value).collect::<Result<Vec<_>, _>>()?;
            encoded.push(Value::Record(args! { "stratum" => stratum, "weight" => *weight }));
        }
        self.add_step(StepType::TakeStratifiedSample,
                      args! {
                          "seed" => seed_or_random(seed),
                          "columns" => selection_to_value(columns),
                          "fractions" => encoded,
                      })
    }

    /// Parte los registros en dos dataflows disjuntos.
    ///
    /// El primero es `self` más un `RandomSplit`; el segundo es un dataflow
    /// nuevo cuyo único step selecciona el complemento del último step del
    /// primero. Sin nombre explícito, el segundo se llama como `self` más el
    /// sufijo configurado.
    pub fn random_split(&self,
                        percentage: f64,
                        seed: Option<u32>,
                        split_dataflow_name: Option<&str>)
                        -> Result<(Dataflow, Dataflow), DataflowError> {
        check_probability("percentage", percentage)?;
        let first = self.add_step(StepType::RandomSplit,
                                  args! { "probability" => percentage, "seed" => seed_or_random(seed) })?;
        let last = first.last_step().ok_or(DataflowError::EmptyDataflow)?;
        let source_filter = resolve(&self.client, &DataflowReference::from(&first))?.with_referenced_step(last);

        let name = match split_dataflow_name {
            Some(name) => name.to_string(),
            None => format!("{}{}", self.name(), self.client.config().split_suffix),
        };
        let second = Dataflow::new(&self.client).set_name(name)
                                                .add_step(StepType::ReferenceAndInverseSplit,
                                                          args! { "sourceFilter" => source_filter })?;
        Ok((first, second))
    }
}
