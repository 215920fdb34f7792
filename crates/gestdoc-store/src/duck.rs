//! DuckDB storage for the case/document tables and the chat history.

use std::path::Path;

use chrono::{NaiveDate, SecondsFormat, Utc};
use duckdb::{Connection, Params, Row, params};
use gestdoc_core::{
    Actor, ActorProfile, ActorRole, ActorStatistics, Breakdown, Case, CaseStatistics, CaseStatus,
    ClientKind, Conversation, ConversationTurn, Document, DocumentStatistics, TurnMetadata,
    TurnRole, User, UserStatistics,
};
use tracing::{debug, info};

use crate::schema::{CHAT_DDL, DOMAIN_DDL, REQUIRED_TABLES};
use crate::{CaseHit, ConversationStore, DocumentHit, DomainSource, StoreError};

/// DuckDB store backing both the domain data source and the conversation store.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for a database file that survives across process restarts. Call
/// [`init_schema`](Self::init_schema) once before the first query.
pub struct DuckStore {
    conn: Connection,
}

// ── Shared SELECT heads ──

const CASE_SELECT: &str = "
SELECT c.id, c.nro_caso, c.tipo_caso, c.descripcion, c.estado, c.prioridad,
       CAST(c.fecha_inicio AS VARCHAR), CAST(c.fecha_fin AS VARCHAR),
       (SELECT count(*)
          FROM documentos d
          JOIN carpetas ca ON d.carpeta_id = ca.id
          JOIN expedientes e ON ca.expediente_id = e.id
         WHERE e.caso_id = c.id)::BIGINT AS documentos
FROM casos c";

const CASE_RECENT_ORDER: &str = "ORDER BY c.fecha_inicio DESC NULLS LAST, c.id DESC";

const DOCUMENT_SELECT: &str = "
SELECT d.id, d.nombre, d.tipo_documento_id, d.etapa_procesal_id, d.palabra_clave,
       d.carpeta_id, CAST(d.fecha_doc AS VARCHAR), d.estado, t.nombre, c.nro_caso
FROM documentos d
JOIN tipos_documento t ON d.tipo_documento_id = t.id
LEFT JOIN carpetas ca ON d.carpeta_id = ca.id
LEFT JOIN expedientes e ON ca.expediente_id = e.id
LEFT JOIN casos c ON e.caso_id = c.id";

const DOCUMENT_RECENT_ORDER: &str = "ORDER BY d.fecha_doc DESC NULLS LAST, d.id DESC";

const ACTOR_SELECT: &str = "
SELECT a.id, a.usuario_id, a.tipo_actor, a.nombres, a.apellido_paterno, a.apellido_materno,
       a.ci, a.telefono, a.estado,
       ab.actor_id IS NOT NULL, ab.nro_credencial, ab.especialidad, ab.estado_licencia,
       cl.actor_id IS NOT NULL, cl.tipo_cliente,
       asi.actor_id IS NOT NULL, asi.area, asi.cargo
FROM actores a
LEFT JOIN abogados ab ON ab.actor_id = a.id
LEFT JOIN clientes cl ON cl.actor_id = a.id
LEFT JOIN asistentes asi ON asi.actor_id = a.id";

/// Case ids an actor participates in, as team member or procedural party.
const ACTOR_CASES: &str = "
SELECT caso_id FROM equipo_caso WHERE actor_id = ?
UNION
SELECT caso_id FROM partes_procesales WHERE cliente_id = ?";

const CONVERSATION_SELECT: &str =
    "SELECT id, usuario_id, titulo, activa, creada_en, actualizada_en FROM conversaciones";

const TURN_SELECT: &str = "
SELECT id, tipo, contenido, enviado_en, tokens_usados, tiempo_respuesta,
       documentos_consultados, entidades_extraidas
FROM mensajes";

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Open or create a persistent DuckDB database at the given path.
    ///
    /// If the file already exists, tables are available immediately. Use
    /// [`has_tables`](Self::has_tables) to check whether initialisation is needed.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Create the domain and chat tables if they do not exist yet.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(DOMAIN_DDL)?;
        self.conn.execute_batch(CHAT_DDL)?;
        info!("schema ready");
        Ok(())
    }

    /// Check whether every table the engine reads from exists.
    pub fn has_tables(&self) -> bool {
        REQUIRED_TABLES.iter().all(|table| {
            self.count(
                "SELECT count(*)::BIGINT FROM information_schema.tables WHERE table_name = ?",
                params![*table],
            )
            .is_ok_and(|n| n == 1)
        })
    }

    /// Run a batch of SQL statements (seeding, maintenance).
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Access the underlying DuckDB connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ── Helpers ──

    fn query_rows<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> duckdb::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<Result<Vec<T>, _>>()?)
    }

    pub(crate) fn count<P: Params>(&self, sql: &str, params: P) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Run a `SELECT label, count` query into a breakdown (count descending).
    fn breakdown(&self, sql: &str) -> Result<Breakdown, StoreError> {
        let rows = self.query_rows(sql, params![], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows
            .into_iter()
            .map(|(label, n)| {
                let label = label
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| "Sin especificar".to_string());
                (label, u64::try_from(n).unwrap_or(0))
            })
            .collect())
    }

    fn case_hits<P: Params>(
        &self,
        filter: &str,
        order: &str,
        params: P,
        limit: usize,
    ) -> Result<Vec<CaseHit>, StoreError> {
        let sql = format!("{CASE_SELECT} {filter} {order} LIMIT {limit}");
        self.query_rows(&sql, params, CaseRow::from_row)?
            .into_iter()
            .map(CaseRow::into_hit)
            .collect()
    }

    fn document_hits<P: Params>(
        &self,
        filter: &str,
        params: P,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        let sql = format!("{DOCUMENT_SELECT} {filter} {DOCUMENT_RECENT_ORDER} LIMIT {limit}");
        self.query_rows(&sql, params, DocumentRow::from_row)?
            .into_iter()
            .map(DocumentRow::into_hit)
            .collect()
    }

    fn actors<P: Params>(
        &self,
        filter: &str,
        params: P,
        limit: usize,
    ) -> Result<Vec<Actor>, StoreError> {
        let sql = format!("{ACTOR_SELECT} {filter} ORDER BY a.id LIMIT {limit}");
        self.query_rows(&sql, params, ActorRow::from_row)?
            .into_iter()
            .map(ActorRow::into_actor)
            .collect()
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_date(column: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>, StoreError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| StoreError::InvalidValue { column, value: s })
    })
    .transpose()
}

// ── Row decoding ──

struct CaseRow {
    id: i64,
    number: String,
    case_type: String,
    description: String,
    status: String,
    priority: String,
    start_date: Option<String>,
    end_date: Option<String>,
    document_count: i64,
}

impl CaseRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            number: row.get(1)?,
            case_type: row.get(2)?,
            description: row.get(3)?,
            status: row.get(4)?,
            priority: row.get(5)?,
            start_date: row.get(6)?,
            end_date: row.get(7)?,
            document_count: row.get(8)?,
        })
    }

    fn into_hit(self) -> Result<CaseHit, StoreError> {
        Ok(CaseHit {
            case: Case {
                id: self.id,
                number: self.number,
                case_type: self.case_type,
                description: self.description,
                status: CaseStatus::from_stored(&self.status),
                priority: self.priority,
                start_date: parse_date("casos.fecha_inicio", self.start_date)?,
                end_date: parse_date("casos.fecha_fin", self.end_date)?,
            },
            document_count: u64::try_from(self.document_count).unwrap_or(0),
        })
    }
}

struct DocumentRow {
    id: i64,
    name: String,
    type_id: i64,
    stage_id: Option<i64>,
    keywords: String,
    folder_id: i64,
    date: Option<String>,
    status: String,
    type_name: String,
    case_number: Option<String>,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            type_id: row.get(2)?,
            stage_id: row.get(3)?,
            keywords: row.get(4)?,
            folder_id: row.get(5)?,
            date: row.get(6)?,
            status: row.get(7)?,
            type_name: row.get(8)?,
            case_number: row.get(9)?,
        })
    }

    fn into_hit(self) -> Result<DocumentHit, StoreError> {
        Ok(DocumentHit {
            document: Document {
                id: self.id,
                name: self.name,
                type_id: self.type_id,
                stage_id: self.stage_id,
                keywords: self.keywords,
                folder_id: self.folder_id,
                date: parse_date("documentos.fecha_doc", self.date)?,
                status: self.status,
            },
            type_name: self.type_name,
            case_number: self.case_number,
        })
    }
}

struct ActorRow {
    id: i64,
    user_id: Option<i64>,
    role_code: String,
    given_names: String,
    paternal_surname: String,
    maternal_surname: String,
    national_id: String,
    phone: String,
    status: String,
    has_lawyer: bool,
    license_number: Option<String>,
    speciality: Option<String>,
    license_status: Option<String>,
    has_client: bool,
    client_kind: Option<String>,
    has_assistant: bool,
    area: Option<String>,
    position: Option<String>,
}

impl ActorRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            role_code: row.get(2)?,
            given_names: row.get(3)?,
            paternal_surname: row.get(4)?,
            maternal_surname: row.get(5)?,
            national_id: row.get(6)?,
            phone: row.get(7)?,
            status: row.get(8)?,
            has_lawyer: row.get(9)?,
            license_number: row.get(10)?,
            speciality: row.get(11)?,
            license_status: row.get(12)?,
            has_client: row.get(13)?,
            client_kind: row.get(14)?,
            has_assistant: row.get(15)?,
            area: row.get(16)?,
            position: row.get(17)?,
        })
    }

    fn into_actor(self) -> Result<Actor, StoreError> {
        let role = ActorRole::from_code(&self.role_code).ok_or(StoreError::InvalidValue {
            column: "actores.tipo_actor",
            value: self.role_code.clone(),
        })?;

        // Only the subtype matching the role tag counts.
        let profile = match role {
            ActorRole::Lawyer if self.has_lawyer => Some(ActorProfile::Lawyer {
                license_number: self.license_number.unwrap_or_default(),
                speciality: self.speciality.unwrap_or_default(),
                license_status: self.license_status.unwrap_or_default(),
            }),
            ActorRole::Client if self.has_client => self
                .client_kind
                .as_deref()
                .and_then(ClientKind::from_stored)
                .map(|kind| ActorProfile::Client { kind }),
            ActorRole::Assistant if self.has_assistant => Some(ActorProfile::Assistant {
                area: self.area.unwrap_or_default(),
                position: self.position.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Actor {
            id: self.id,
            user_id: self.user_id,
            role,
            given_names: self.given_names,
            paternal_surname: self.paternal_surname,
            maternal_surname: self.maternal_surname,
            national_id: self.national_id,
            phone: self.phone,
            status: self.status,
            profile,
        })
    }
}

fn conversation_from_row(row: &Row<'_>) -> duckdb::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        active: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

struct TurnRow {
    id: i64,
    role: String,
    content: String,
    sent_at: String,
    tokens_used: Option<i64>,
    latency_seconds: Option<f64>,
    consulted_ids: String,
    extracted_entities: String,
}

impl TurnRow {
    fn from_row(row: &Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            role: row.get(1)?,
            content: row.get(2)?,
            sent_at: row.get(3)?,
            tokens_used: row.get(4)?,
            latency_seconds: row.get(5)?,
            consulted_ids: row.get(6)?,
            extracted_entities: row.get(7)?,
        })
    }

    fn into_turn(self) -> Result<ConversationTurn, StoreError> {
        let role = TurnRole::from_stored(&self.role).ok_or(StoreError::InvalidValue {
            column: "mensajes.tipo",
            value: self.role.clone(),
        })?;
        Ok(ConversationTurn {
            id: self.id,
            role,
            content: self.content,
            sent_at: self.sent_at,
            metadata: TurnMetadata {
                tokens_used: self.tokens_used.and_then(|n| u32::try_from(n).ok()),
                latency_seconds: self.latency_seconds,
                consulted_ids: serde_json::from_str(&self.consulted_ids)?,
                extracted_entities: serde_json::from_str(&self.extracted_entities)?,
            },
        })
    }
}

// ── Domain data source ──

impl DomainSource for DuckStore {
    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.query_rows(
            "SELECT id, username, is_active, rol FROM usuarios WHERE username = ?",
            params![username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    is_active: row.get(2)?,
                    role: row.get(3)?,
                })
            },
        )?;
        Ok(users.into_iter().next())
    }

    fn linked_actor(&self, user_id: i64) -> Result<Option<Actor>, StoreError> {
        let actors = self.actors("WHERE a.usuario_id = ?", params![user_id], 1)?;
        Ok(actors.into_iter().next())
    }

    fn cases_by_number(&self, fragment: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.case_hits(
            "WHERE contains(lower(c.nro_caso), lower(?))",
            "ORDER BY c.nro_caso",
            params![fragment],
            limit,
        )
    }

    fn cases_by_status(
        &self,
        status: &CaseStatus,
        limit: usize,
    ) -> Result<Vec<CaseHit>, StoreError> {
        self.case_hits(
            "WHERE c.estado = ?",
            CASE_RECENT_ORDER,
            params![status.as_str()],
            limit,
        )
    }

    fn cases_by_type(&self, type_name: &str, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.case_hits(
            "WHERE contains(lower(c.tipo_caso), lower(?))",
            CASE_RECENT_ORDER,
            params![type_name],
            limit,
        )
    }

    fn recent_cases(&self, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        self.case_hits("", CASE_RECENT_ORDER, params![], limit)
    }

    fn cases_for_actor(&self, actor_id: i64, limit: usize) -> Result<Vec<CaseHit>, StoreError> {
        let filter = format!("WHERE c.id IN ({ACTOR_CASES})");
        self.case_hits(&filter, CASE_RECENT_ORDER, params![actor_id, actor_id], limit)
    }

    fn documents_matching(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        self.document_hits(
            "WHERE contains(lower(d.nombre), lower(?)) OR contains(lower(d.palabra_clave), lower(?))",
            params![text, text],
            limit,
        )
    }

    fn documents_by_type_mention(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        self.document_hits(
            "WHERE contains(lower(?), lower(t.nombre))",
            params![text],
            limit,
        )
    }

    fn recent_documents(&self, limit: usize) -> Result<Vec<DocumentHit>, StoreError> {
        self.document_hits("", params![], limit)
    }

    fn documents_for_actor(
        &self,
        actor_id: i64,
        limit: usize,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        let filter = format!("WHERE c.id IN ({ACTOR_CASES})");
        self.document_hits(&filter, params![actor_id, actor_id], limit)
    }

    fn actors_matching(&self, text: &str, limit: usize) -> Result<Vec<Actor>, StoreError> {
        self.actors(
            "WHERE contains(lower(a.nombres), lower(?))
                OR contains(lower(a.apellido_paterno), lower(?))
                OR contains(lower(a.apellido_materno), lower(?))
                OR contains(lower(a.ci), lower(?))",
            params![text, text, text, text],
            limit,
        )
    }

    fn actors_by_role(&self, role: ActorRole, limit: usize) -> Result<Vec<Actor>, StoreError> {
        self.actors("WHERE a.tipo_actor = ?", params![role.code()], limit)
    }

    fn case_statistics(&self) -> Result<CaseStatistics, StoreError> {
        Ok(CaseStatistics {
            total: self.count("SELECT count(*)::BIGINT FROM casos", params![])?,
            open: self.count(
                "SELECT count(*)::BIGINT FROM casos WHERE estado = ?",
                params![CaseStatus::Open.as_str()],
            )?,
            closed: self.count(
                "SELECT count(*)::BIGINT FROM casos WHERE estado = ?",
                params![CaseStatus::Closed.as_str()],
            )?,
            by_type: self.breakdown(
                "SELECT tipo_caso, count(*)::BIGINT AS n FROM casos
                 GROUP BY tipo_caso ORDER BY n DESC, tipo_caso",
            )?,
            by_status: self.breakdown(
                "SELECT estado, count(*)::BIGINT AS n FROM casos
                 GROUP BY estado ORDER BY n DESC, estado",
            )?,
        })
    }

    fn document_statistics(&self) -> Result<DocumentStatistics, StoreError> {
        Ok(DocumentStatistics {
            total: self.count("SELECT count(*)::BIGINT FROM documentos", params![])?,
            with_keywords: self.count(
                "SELECT count(*)::BIGINT FROM documentos WHERE palabra_clave <> ''",
                params![],
            )?,
            without_keywords: self.count(
                "SELECT count(*)::BIGINT FROM documentos WHERE palabra_clave = ''",
                params![],
            )?,
            by_type: self.breakdown(
                "SELECT t.nombre, count(*)::BIGINT AS n
                 FROM documentos d JOIN tipos_documento t ON d.tipo_documento_id = t.id
                 GROUP BY t.nombre ORDER BY n DESC, t.nombre",
            )?,
        })
    }

    fn actor_statistics(&self) -> Result<ActorStatistics, StoreError> {
        Ok(ActorStatistics {
            total: self.count("SELECT count(*)::BIGINT FROM actores", params![])?,
            lawyers: self.count("SELECT count(*)::BIGINT FROM abogados", params![])?,
            clients: self.count("SELECT count(*)::BIGINT FROM clientes", params![])?,
            assistants: self.count("SELECT count(*)::BIGINT FROM asistentes", params![])?,
            by_speciality: self.breakdown(
                "SELECT especialidad, count(*)::BIGINT AS n FROM abogados
                 GROUP BY especialidad ORDER BY n DESC, especialidad",
            )?,
            by_client_kind: self.breakdown(
                "SELECT tipo_cliente, count(*)::BIGINT AS n FROM clientes
                 GROUP BY tipo_cliente ORDER BY n DESC, tipo_cliente",
            )?,
        })
    }

    fn user_statistics(&self) -> Result<UserStatistics, StoreError> {
        Ok(UserStatistics {
            total: self.count("SELECT count(*)::BIGINT FROM usuarios", params![])?,
            active: self.count(
                "SELECT count(*)::BIGINT FROM usuarios WHERE is_active",
                params![],
            )?,
            inactive: self.count(
                "SELECT count(*)::BIGINT FROM usuarios WHERE NOT is_active",
                params![],
            )?,
            by_role: self.breakdown(
                "SELECT rol, count(*)::BIGINT AS n FROM usuarios
                 GROUP BY rol ORDER BY n DESC, rol NULLS LAST",
            )?,
        })
    }
}

// ── Conversation store ──

impl ConversationStore for DuckStore {
    fn create_conversation(&self, user_id: i64, title: &str) -> Result<Conversation, StoreError> {
        let now = now_iso();
        let id: i64 = self.conn.query_row(
            "INSERT INTO conversaciones (usuario_id, titulo, activa, creada_en, actualizada_en)
             VALUES (?, ?, true, ?, ?) RETURNING id",
            params![user_id, title, now, now],
            |row| row.get(0),
        )?;
        info!(conversation_id = id, user_id, "conversation created");
        Ok(Conversation {
            id,
            user_id,
            title: title.to_string(),
            active: true,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn conversation(&self, id: i64, user_id: i64) -> Result<Option<Conversation>, StoreError> {
        let sql = format!("{CONVERSATION_SELECT} WHERE id = ? AND usuario_id = ? AND activa");
        let rows = self.query_rows(&sql, params![id, user_id], conversation_from_row)?;
        Ok(rows.into_iter().next())
    }

    fn list_conversations(&self, user_id: i64) -> Result<Vec<Conversation>, StoreError> {
        let sql = format!(
            "{CONVERSATION_SELECT} WHERE usuario_id = ? AND activa
             ORDER BY actualizada_en DESC, id DESC"
        );
        self.query_rows(&sql, params![user_id], conversation_from_row)
    }

    fn append_turn(
        &self,
        conversation_id: i64,
        role: TurnRole,
        content: &str,
        metadata: &TurnMetadata,
    ) -> Result<ConversationTurn, StoreError> {
        let sent_at = now_iso();
        let consulted = serde_json::to_string(&metadata.consulted_ids)?;
        let entities = serde_json::to_string(&metadata.extracted_entities)?;
        let id: i64 = self.conn.query_row(
            "INSERT INTO mensajes (conversacion_id, tipo, contenido, enviado_en, tokens_usados,
                                   tiempo_respuesta, documentos_consultados, entidades_extraidas)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
            params![
                conversation_id,
                role.as_str(),
                content,
                sent_at,
                metadata.tokens_used.map(i64::from),
                metadata.latency_seconds,
                consulted,
                entities,
            ],
            |row| row.get(0),
        )?;
        debug!(conversation_id, turn_id = id, role = role.as_str(), "turn persisted");
        Ok(ConversationTurn {
            id,
            role,
            content: content.to_string(),
            sent_at,
            metadata: metadata.clone(),
        })
    }

    fn list_recent_turns(
        &self,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let sql = format!(
            "SELECT * FROM ({TURN_SELECT} WHERE conversacion_id = ? ORDER BY id DESC LIMIT {limit})
             ORDER BY id"
        );
        self.query_rows(&sql, params![conversation_id], TurnRow::from_row)?
            .into_iter()
            .map(TurnRow::into_turn)
            .collect()
    }

    fn list_turns(&self, conversation_id: i64) -> Result<Vec<ConversationTurn>, StoreError> {
        let sql = format!("{TURN_SELECT} WHERE conversacion_id = ? ORDER BY id");
        self.query_rows(&sql, params![conversation_id], TurnRow::from_row)?
            .into_iter()
            .map(TurnRow::into_turn)
            .collect()
    }

    fn touch_conversation(&self, id: i64) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE conversaciones SET actualizada_en = ? WHERE id = ?",
            params![now_iso(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                what: "conversation",
                id,
            });
        }
        Ok(())
    }

    fn deactivate_conversation(&self, id: i64, user_id: i64) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE conversaciones SET activa = false
             WHERE id = ? AND usuario_id = ? AND activa",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_demo;

    fn seeded() -> DuckStore {
        let store = DuckStore::open().unwrap();
        store.init_schema().unwrap();
        seed_demo(&store).unwrap();
        store
    }

    #[test]
    fn open_in_memory() {
        let store = DuckStore::open().unwrap();
        assert_eq!(store.count("SELECT 1::BIGINT", params![]).unwrap(), 1);
    }

    #[test]
    fn has_tables_false_for_empty_memory() {
        let store = DuckStore::open().unwrap();
        assert!(!store.has_tables());
    }

    #[test]
    fn init_schema_is_idempotent() {
        let store = DuckStore::open().unwrap();
        store.init_schema().unwrap();
        store.init_schema().unwrap();
        assert!(store.has_tables());
    }

    // ── Cases ──

    #[test]
    fn case_number_match_is_case_insensitive() {
        let store = seeded();
        let hits = store.cases_by_number("civ-2024-001", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].case.number, "CIV-2024-001");
    }

    #[test]
    fn document_count_walks_folder_chain() {
        let store = seeded();
        let hits = store.cases_by_number("CIV-2024-001", 10).unwrap();
        // Two folders (one nested) under the same expediente.
        assert_eq!(hits[0].document_count, 3);
    }

    #[test]
    fn status_filter_returns_only_that_status() {
        let store = seeded();
        let closed = store.cases_by_status(&CaseStatus::Closed, 10).unwrap();
        assert_eq!(closed.len(), 2);
        assert!(closed.iter().all(|h| h.case.status == CaseStatus::Closed));
    }

    #[test]
    fn recent_cases_newest_first_and_limited() {
        let store = seeded();
        let hits = store.recent_cases(3).unwrap();
        let numbers: Vec<&str> = hits.iter().map(|h| h.case.number.as_str()).collect();
        assert_eq!(numbers, ["FAM-2024-006", "PEN-2024-002", "COM-2024-004"]);
    }

    #[test]
    fn cases_for_actor_uses_team_and_parties() {
        let store = seeded();
        // Lawyer on the team of four cases.
        let lawyer = store.cases_for_actor(1, 10).unwrap();
        assert_eq!(lawyer.len(), 4);
        // Client party to two cases.
        let client = store.cases_for_actor(3, 10).unwrap();
        let mut numbers: Vec<&str> = client.iter().map(|h| h.case.number.as_str()).collect();
        numbers.sort();
        assert_eq!(numbers, ["CIV-2024-001", "FAM-2024-006"]);
    }

    // ── Documents ──

    #[test]
    fn documents_match_name_or_keyword() {
        let store = seeded();
        let by_keyword = store.documents_matching("honorarios", 5).unwrap();
        assert_eq!(by_keyword.len(), 1);
        assert_eq!(by_keyword[0].document.name, "Factura de Honorarios");
        assert_eq!(by_keyword[0].case_number.as_deref(), Some("COM-2024-004"));
    }

    #[test]
    fn documents_by_type_mention_reverses_containment() {
        let store = seeded();
        let hits = store
            .documents_by_type_mention("quiero ver el contrato firmado", 5)
            .unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.type_name == "Contrato"));
    }

    #[test]
    fn documents_for_actor_follow_their_cases() {
        let store = seeded();
        let hits = store.documents_for_actor(1, 10).unwrap();
        assert_eq!(hits.len(), 6);
        let own = ["CIV-2024-001", "CIV-2024-005", "FAM-2024-006", "PEN-2024-002"];
        for hit in &hits {
            let number = hit.case_number.as_deref().unwrap();
            assert!(own.contains(&number), "{number}");
        }
        assert!(store.documents_for_actor(99, 10).unwrap().is_empty());
    }

    #[test]
    fn recent_documents_newest_first() {
        let store = seeded();
        let hits = store.recent_documents(5).unwrap();
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].document.name, "Resolución - Pensión");
        assert!(hits[0].document.date >= hits[4].document.date);
    }

    // ── Actors ──

    #[test]
    fn actor_profiles_follow_role() {
        let store = seeded();
        let lawyers = store.actors_by_role(ActorRole::Lawyer, 10).unwrap();
        let with_profile = lawyers.iter().filter(|a| a.profile.is_some()).count();
        // One lawyer has no subtype row yet.
        assert_eq!(lawyers.len(), 3);
        assert_eq!(with_profile, 2);

        let clients = store.actors_by_role(ActorRole::Client, 10).unwrap();
        assert!(clients.iter().any(|a| matches!(
            a.profile,
            Some(ActorProfile::Client {
                kind: ClientKind::Corporate
            })
        )));
    }

    #[test]
    fn linked_actor_resolves_through_user() {
        let store = seeded();
        let user = store.user_by_username("cmendoza").unwrap().unwrap();
        let actor = store.linked_actor(user.id).unwrap().unwrap();
        assert_eq!(actor.full_name(), "Carlos Mendoza Rojas");

        let guest = store.user_by_username("invitado").unwrap().unwrap();
        assert!(store.linked_actor(guest.id).unwrap().is_none());
    }

    #[test]
    fn actors_match_national_id() {
        let store = seeded();
        let hits = store.actors_matching("6789012", 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].role, ActorRole::Client);
    }

    // ── Aggregates ──

    #[test]
    fn statistics_match_seed() {
        let store = seeded();
        let cases = store.case_statistics().unwrap();
        assert_eq!(cases.total, 7);
        assert_eq!(cases.open, 5);
        assert_eq!(cases.closed, 2);
        assert_eq!(cases.by_status[0], ("ABIERTO".to_string(), 5));

        let docs = store.document_statistics().unwrap();
        assert_eq!(docs.total, 11);
        assert_eq!(docs.with_keywords + docs.without_keywords, docs.total);

        let actors = store.actor_statistics().unwrap();
        assert_eq!((actors.total, actors.lawyers, actors.clients, actors.assistants), (6, 2, 2, 1));

        let users = store.user_statistics().unwrap();
        assert_eq!(users.total, 8);
        assert_eq!(users.inactive, 1);
    }

    // ── Conversations ──

    #[test]
    fn conversation_scoped_to_owner() {
        let store = seeded();
        let conv = store.create_conversation(2, "mis casos").unwrap();
        assert!(store.conversation(conv.id, 2).unwrap().is_some());
        assert!(store.conversation(conv.id, 4).unwrap().is_none());
    }

    #[test]
    fn recent_turns_are_oldest_first_within_window() {
        let store = seeded();
        let conv = store.create_conversation(2, "t").unwrap();
        for i in 0..8 {
            let role = if i % 2 == 0 {
                TurnRole::User
            } else {
                TurnRole::Assistant
            };
            store
                .append_turn(conv.id, role, &format!("turn {i}"), &TurnMetadata::default())
                .unwrap();
        }
        let window = store.list_recent_turns(conv.id, 6).unwrap();
        let contents: Vec<&str> = window.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(
            contents,
            ["turn 2", "turn 3", "turn 4", "turn 5", "turn 6", "turn 7"]
        );
        assert_eq!(store.list_turns(conv.id).unwrap().len(), 8);
    }

    #[test]
    fn turn_metadata_persists() {
        let store = seeded();
        let conv = store.create_conversation(2, "t").unwrap();
        let meta = TurnMetadata {
            tokens_used: Some(321),
            latency_seconds: Some(0.75),
            consulted_ids: vec![4, 9],
            extracted_entities: vec!["contrato".into()],
        };
        store
            .append_turn(conv.id, TurnRole::Assistant, "respuesta", &meta)
            .unwrap();
        let turns = store.list_turns(conv.id).unwrap();
        assert_eq!(turns[0].metadata, meta);
        assert_eq!(turns[0].role, TurnRole::Assistant);
    }

    #[test]
    fn deactivated_conversations_disappear() {
        let store = seeded();
        let conv = store.create_conversation(2, "borrar").unwrap();
        assert!(!store.deactivate_conversation(conv.id, 3).unwrap());
        assert!(store.deactivate_conversation(conv.id, 2).unwrap());
        assert!(store.conversation(conv.id, 2).unwrap().is_none());
        assert!(store.list_conversations(2).unwrap().is_empty());
    }

    #[test]
    fn touching_missing_conversation_fails() {
        let store = seeded();
        let err = store.touch_conversation(999).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 999, .. }));
    }

    // ── Persistent storage ──

    #[test]
    fn persistent_history_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("test.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        assert!(!store.has_tables());
        store.init_schema().unwrap();
        let conv = store.create_conversation(1, "persistente").unwrap();
        store
            .append_turn(conv.id, TurnRole::User, "hola", &TurnMetadata::default())
            .unwrap();
        drop(store);

        let store = DuckStore::open_persistent(&db_path).unwrap();
        assert!(store.has_tables());
        let turns = store.list_turns(conv.id).unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "hola");
    }
}
