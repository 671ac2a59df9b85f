//! Manual en texto plano de una receta.
//!
//! Los tags se muestran parcialmente especializados: los slots que fija
//! `bindings` se sustituyen y el resto queda como `{slot}`.
use metis_domain::SlotBindings;

use crate::errors::PipelineError;
use crate::recipe::Recipe;

pub fn describe(recipe: &dyn Recipe, bindings: &SlotBindings) -> Result<String, PipelineError> {
    let mut lines = vec![format!("{} (version {})", recipe.name(), recipe.version()),
                         format!("  {}", recipe.synopsis()),
                         String::new(),
                         "Inputs:".to_string()];
    for spec in recipe.inputs()? {
        let item = spec.item.specialize(bindings);
        lines.push(format!("  {:<12} {:<32} {:<8} {:<8} {}",
                           spec.name,
                           item.resolved_name(),
                           if spec.required { "required" } else { "optional" },
                           spec.cardinality.as_str(),
                           item.resolved_title()));
    }

    lines.push(String::new());
    lines.push("Products:".to_string());
    for template in recipe.products() {
        let item = template.specialize(bindings);
        let attr = |v: Option<&'static str>| v.unwrap_or("-");
        lines.push(format!("  {:<32} {:<8} {:<12} {:<5} {}",
                           item.resolved_name(),
                           attr(item.group.map(|g| g.as_str())),
                           attr(item.level.map(|l| l.as_str())),
                           attr(item.frame_type.map(|t| t.as_str())),
                           item.resolved_title()));
    }

    let params = recipe.parameters();
    if !params.is_empty() {
        lines.push(String::new());
        lines.push("Parameters:".to_string());
        for p in params {
            let mut line = format!("  {} = {}  {}", p.name, p.default, p.description);
            if !p.choices.is_empty() {
                let choices: Vec<String> = p.choices.iter().map(|c| c.to_string()).collect();
                line.push_str(&format!(" [{}]", choices.join(", ")));
            }
            lines.push(line);
        }
    }
    lines.push(String::new());
    Ok(lines.join("\n"))
}
