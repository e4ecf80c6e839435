use std::fmt;

use super::Dataflow;

impl fmt::Display for Dataflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataflow")?;
        writeln!(f, "  name: {}", self.name())?;
        writeln!(f, "  parent_package_path: {}", self.parent_package_path().unwrap_or("None"))?;
        writeln!(f, "  steps: [")?;
        for step in self.steps.to_vec() {
            writeln!(f, "    {step},")?;
        }
        write!(f, "  ]")
    }
}
