//! Context assembler: direct answer short-circuit, or the system prompt,
//! context block, and history window for a generation call.

use gestdoc_ai::ChatMessage;
use gestdoc_core::{ConversationTurn, RetrievalBundle};

use crate::format;

pub const SYSTEM_PROMPT: &str = "Eres un asistente legal especializado en gestión documental para el sistema GestDocSi2.

REGLAS CRÍTICAS:
- NUNCA inventes información que no esté en el contexto proporcionado
- SIEMPRE usa únicamente los datos reales de la base de datos que se te proporcionan
- Si no hay información suficiente en el contexto, di claramente \"No se encontró información específica\"
- NO generes nombres, fechas, números de caso o información que no esté en los datos reales

Tu función es ayudar a los usuarios a:
1. Buscar y encontrar documentos específicos
2. Analizar información de casos legales
3. Proporcionar información sobre actores del sistema (abogados, clientes, asistentes)
4. Responder preguntas sobre el estado de casos y expedientes

INSTRUCCIONES:
- Responde en el mismo idioma de la pregunta; por defecto, en español
- Sé profesional y preciso
- Usa ÚNICAMENTE la información que se te proporciona en el contexto
- Si encuentras información relevante en el contexto, úsala para dar una respuesta completa
- Si no encuentras información específica, indícalo claramente
- Estructura tu respuesta de manera clara y organizada
- Incluye referencias específicas a documentos, casos o actores cuando estén disponibles en el contexto

FORMATO DE RESPUESTA:
- Usa viñetas para organizar información
- Incluye números de caso, nombres de documentos y fechas SOLO cuando estén en el contexto
- Proporciona referencias específicas SOLO cuando estén disponibles en los datos reales";

/// Everything the gateway needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system_prompt: String,
    pub context_block: String,
    /// Prior turns, oldest first, roles alternating from user.
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    /// Answer verbatim; no generation call.
    Direct(String),
    Generate(Prompt),
}

/// Last `window` turns, oldest first, with roles assigned by position:
/// even index is the user, odd index the assistant.
pub fn history_window(history: &[ConversationTurn], window: usize) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            if i % 2 == 0 {
                ChatMessage::user(turn.content.clone())
            } else {
                ChatMessage::assistant(turn.content.clone())
            }
        })
        .collect()
}

pub fn assemble(bundle: &RetrievalBundle, history: &[ConversationTurn], window: usize) -> Assembly {
    if let Some(answer) = &bundle.direct_answer {
        return Assembly::Direct(answer.clone());
    }
    Assembly::Generate(Prompt {
        system_prompt: SYSTEM_PROMPT.to_string(),
        context_block: format::format(bundle),
        history: history_window(history, window),
    })
}
