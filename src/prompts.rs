//! Prompts sent to the hosted models.
//!
//! Both calls use fixed Spanish prompts: one framing the vision model as a
//! legal OCR expert for scanned pages, one asking the text model to fill the
//! 20-row contract table. Keeping them here lets tests inspect the exact text
//! without a live provider.

/// System message for page transcription.
pub const TRANSCRIPTION_SYSTEM_PROMPT: &str =
    "Eres un experto en contratos públicos y OCR legal.";

/// User instruction sent alongside each page image.
pub const TRANSCRIPTION_USER_PROMPT: &str = "Lee la imagen adjunta de un contrato, extrae todo el texto útil y, si detectas información de partes, objeto, monto, plazo, garantías, \
obligaciones, penalizaciones, modificaciones, normatividad aplicable, resolución de controversias, firmas o anexos, indícalo claramente. \
No agregues explicaciones, solo texto estructurado.";

/// System message for the summary call.
pub const SUMMARY_SYSTEM_PROMPT: &str = "Eres un experto en contratos públicos. Devuelve solo la tabla, siguiendo exactamente el formato y campos indicados, sin texto extra, sin contexto ni interpretaciones.";

/// Field labels of the summary table, in the order the model must emit them.
pub const SUMMARY_FIELDS: [&str; 20] = [
    "Partes",
    "Objeto",
    "Monto antes de IVA",
    "IVA",
    "Monto total",
    "Fecha de inicio",
    "Fecha de fin",
    "Vigencia/Plazo",
    "Garantía(s)",
    "Obligaciones proveedor",
    "Supervisión",
    "Penalizaciones",
    "Penalización máxima",
    "Modificaciones",
    "Normatividad aplicable",
    "Resolución de controversias",
    "Firmas",
    "Anexos",
    "No localizado",
    "Áreas de mejora",
];

const SUMMARY_PREAMBLE: &str = "Eres un analista legal experto en contratos públicos. Recibiste el texto extraído de un contrato de la administración pública mexicana. \
DEBES LLENAR CADA CAMPO DE LA SIGUIENTE TABLA (presenta solo la tabla, formato markdown, nada más) con la información literal del texto, sin explicar, resumir, interpretar, fusionar, ni reorganizar datos. \
NO inventes, NO omitas, NO combines, NO uses frases generales. Si no encuentras el dato, escribe 'NO LOCALIZADO' exactamente así, sin adornos. \
NO repitas el texto del contrato ni des contexto fuera de la tabla. NO elimines ningún campo aunque esté vacío. \
SIEMPRE utiliza el mismo orden y formato.";

const SUMMARY_TABLE_TEMPLATE: &str = "\
| Campo                       | Respuesta                                                         |
|-----------------------------|--------------------------------------------------------------------|
| Partes                      | Por la Secretaría: [Nombres y cargos literales]. Por el Proveedor: [Nombres, cargos, razón social literal]. |
| Objeto                      | [Todos los servicios, bienes u obras, uno por renglón literal].    |
| Monto antes de IVA          | $[####,###.##] MXN (literal).                                      |
| IVA                         | $[####,###.##] MXN (literal).                                      |
| Monto total                 | $[####,###.##] MXN (literal).                                      |
| Fecha de inicio             | [Fecha literal].                                                   |
| Fecha de fin                | [Fecha literal].                                                   |
| Vigencia/Plazo              | [Literal].                                                        |
| Garantía(s)                 | [Tipo, porcentaje y condiciones de cada garantía, literal].        |
| Obligaciones proveedor      | [Cada obligación textual, en renglón aparte].                     |
| Supervisión                 | [Cargo(s), nombre(s) responsable(s) textual(es)].                  |
| Penalizaciones              | [Cada penalización, monto y condición, renglón aparte, literal].   |
| Penalización máxima         | [Literal].                                                        |
| Modificaciones              | [Procedimiento, máximo permitido, fundamento legal, renglón aparte, literal]. |
| Normatividad aplicable      | [Cada ley, reglamento, NOM o código textual, renglón aparte].      |
| Resolución de controversias | [Literal. Si no hay procedimiento, inicia con 'NO LOCALIZADO.'].   |
| Firmas                      | Por la Secretaría: [Nombres y cargos]. Por el Proveedor: [Nombres, cargos, razón social]. |
| Anexos                      | Número, nombre y descripción literal de cada anexo.                |
| No localizado               | [Lista concreta de todo campo importante, dato o requisito legal que falte o esté incompleto. Si todo está, pon 'Ninguno.'] |
| Áreas de mejora             | [Cada área de posible subjetividad, ambigüedad o riesgo de controversia. Si no hay, pon 'Ninguna.'] |
";

const SUMMARY_CLOSING: &str = "LLENA CADA CAMPO CON SOLO LA INFORMACIÓN LITERAL DEL CONTRATO. NO CAMBIES EL FORMATO DE LA TABLA. \
Aquí está el texto del contrato:\n\n";

/// Build the user message for the summary call.
///
/// The document text is appended last and unmodified.
pub fn build_summary_prompt(full_text: &str) -> String {
    let mut prompt = String::with_capacity(
        SUMMARY_PREAMBLE.len() + SUMMARY_TABLE_TEMPLATE.len() + SUMMARY_CLOSING.len() + full_text.len() + 4,
    );
    prompt.push_str(SUMMARY_PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(SUMMARY_TABLE_TEMPLATE);
    prompt.push('\n');
    prompt.push_str(SUMMARY_CLOSING);
    prompt.push_str(full_text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_lists_every_field_in_order() {
        let prompt = build_summary_prompt("texto");
        let mut cursor = 0;
        for field in SUMMARY_FIELDS {
            let row = format!("| {field} ");
            let pos = prompt[cursor..]
                .find(&row)
                .unwrap_or_else(|| panic!("row {field:?} missing or out of order"));
            cursor += pos + row.len();
        }
    }

    #[test]
    fn summary_prompt_ends_with_document_text() {
        let text = "CLÁUSULA PRIMERA.- OBJETO\n\nEl proveedor se obliga…";
        let prompt = build_summary_prompt(text);
        assert!(prompt.ends_with(&format!("Aquí está el texto del contrato:\n\n{text}")));
    }

    #[test]
    fn summary_prompt_demands_sentinel() {
        let prompt = build_summary_prompt("");
        assert!(prompt.contains("escribe 'NO LOCALIZADO' exactamente así"));
        assert!(prompt.contains("presenta solo la tabla"));
    }

    #[test]
    fn template_has_header_plus_twenty_rows() {
        let rows = SUMMARY_TABLE_TEMPLATE
            .lines()
            .filter(|l| l.starts_with('|'))
            .count();
        assert_eq!(rows, 2 + SUMMARY_FIELDS.len());
    }

    #[test]
    fn transcription_prompt_names_contract_elements() {
        for needle in ["partes", "garantías", "penalizaciones", "firmas", "anexos"] {
            assert!(TRANSCRIPTION_USER_PROMPT.contains(needle), "missing {needle}");
        }
    }
}
