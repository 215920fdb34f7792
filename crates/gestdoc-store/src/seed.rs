//! Deterministic demo dataset for local runs and tests.

use duckdb::params;
use tracing::info;

use crate::{DuckStore, StoreError};

/// What [`seed_demo`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: u64,
    pub cases: u64,
    pub documents: u64,
    /// The store already held users, so nothing was inserted.
    pub skipped: bool,
}

const DEMO_SQL: &str = "
INSERT INTO usuarios (id, username, is_active, rol) VALUES
    (1, 'admin', true, 'Administrador'),
    (2, 'cmendoza', true, 'Abogado'),
    (3, 'afernandez', true, 'Abogado'),
    (4, 'lquispe', true, 'Cliente'),
    (5, 'constructora_andina', true, 'Cliente'),
    (6, 'rflores', true, 'Asistente'),
    (7, 'invitado', true, 'Consulta'),
    (8, 'jvaca', false, 'Abogado');

INSERT INTO actores (id, usuario_id, tipo_actor, nombres, apellido_paterno, apellido_materno, ci, telefono) VALUES
    (1, 2, 'ABO', 'Carlos', 'Mendoza', 'Rojas', '4567890', '70012345'),
    (2, 3, 'ABO', 'Ana', 'Fernández', 'Vargas', '5678901', '70023456'),
    (3, 4, 'CLI', 'Luis', 'Quispe', 'Mamani', '6789012', '71034567'),
    (4, 5, 'CLI', 'Constructora', 'Andina', 'S.R.L.', '1020304015', '22145678'),
    (5, 6, 'ASI', 'Rosa', 'Flores', 'Choque', '7890123', '72045678'),
    (6, NULL, 'ABO', 'Jorge', 'Salinas', 'Paz', '3456789', '');

INSERT INTO abogados (actor_id, nro_credencial, especialidad, estado_licencia) VALUES
    (1, 'LP-1001', 'Derecho Civil', 'VIGENTE'),
    (2, 'LP-1002', 'Derecho Laboral', 'VIGENTE');

INSERT INTO clientes (actor_id, tipo_cliente, observaciones) VALUES
    (3, 'NATURAL', ''),
    (4, 'JURIDICO', 'Cliente corporativo desde 2022');

INSERT INTO asistentes (actor_id, area, cargo) VALUES
    (5, 'Litigios', 'Procuradora');

INSERT INTO casos (id, nro_caso, tipo_caso, descripcion, estado, prioridad, fecha_inicio, fecha_fin) VALUES
    (1, 'CIV-2024-001', 'Divorcio', 'Proceso de divorcio por mutuo acuerdo con división de bienes gananciales', 'ABIERTO', 'MEDIA', DATE '2024-03-01', NULL),
    (2, 'PEN-2024-002', 'Robo', 'Defensa penal en caso de robo agravado en domicilio particular', 'ABIERTO', 'ALTA', DATE '2024-03-16', NULL),
    (3, 'LAB-2024-003', 'Despido Injustificado', 'Demanda laboral por despido injustificado sin pago de beneficios sociales, con reclamo de desahucio, indemnización por años de servicio y aguinaldo', 'ABIERTO', 'ALTA', DATE '2024-02-15', NULL),
    (4, 'COM-2024-004', 'Incumplimiento Contractual', 'Reclamo por incumplimiento de contrato de obra civil', 'ABIERTO', 'MEDIA', DATE '2024-03-10', NULL),
    (5, 'CIV-2024-005', 'Sucesión', 'Proceso de sucesión intestada de bienes inmuebles', 'CERRADO', 'BAJA', DATE '2023-12-01', DATE '2024-02-25'),
    (6, 'FAM-2024-006', 'Pensión Alimenticia', 'Demanda de asistencia familiar para dos menores', 'ABIERTO', 'ALTA', DATE '2024-03-20', NULL),
    (7, 'CON-2023-007', 'Recurso de Amparo', 'Recurso de amparo constitucional contra resolución administrativa', 'CERRADO', 'MEDIA', DATE '2023-09-05', DATE '2024-01-10');

INSERT INTO equipo_caso (actor_id, caso_id, rol_en_equipo) VALUES
    (1, 1, 'RESPONSABLE'),
    (1, 2, 'ASOCIADO'),
    (1, 5, 'RESPONSABLE'),
    (1, 6, 'RESPONSABLE'),
    (2, 3, 'RESPONSABLE'),
    (2, 4, 'RESPONSABLE'),
    (5, 1, 'ASISTENTE'),
    (5, 3, 'ASISTENTE');

INSERT INTO partes_procesales (cliente_id, caso_id, rol_procesal) VALUES
    (3, 1, 'DEMANDANTE'),
    (3, 6, 'DEMANDANTE'),
    (4, 4, 'DEMANDANTE');

INSERT INTO expedientes (id, caso_id, nro_expediente, estado) VALUES
    (1, 1, 'EXP-CIV-2024-001', 'ABIERTO'),
    (2, 2, 'EXP-PEN-2024-002', 'ABIERTO'),
    (3, 3, 'EXP-LAB-2024-003', 'ABIERTO'),
    (4, 4, 'EXP-COM-2024-004', 'ABIERTO'),
    (5, 5, 'EXP-CIV-2024-005', 'CERRADO'),
    (6, 6, 'EXP-FAM-2024-006', 'ABIERTO'),
    (7, 7, 'EXP-CON-2023-007', 'CERRADO');

INSERT INTO carpetas (id, expediente_id, nombre, carpeta_padre_id) VALUES
    (1, 1, 'Principal', NULL),
    (2, 1, 'Pruebas', 1),
    (3, 2, 'Principal', NULL),
    (4, 3, 'Principal', NULL),
    (5, 4, 'Principal', NULL),
    (6, 5, 'Principal', NULL),
    (7, 6, 'Principal', NULL),
    (8, 7, 'Principal', NULL);

INSERT INTO tipos_documento (id, nombre) VALUES
    (1, 'Demanda'),
    (2, 'Contestación'),
    (3, 'Escrito de Pruebas'),
    (4, 'Testimonio'),
    (5, 'Peritaje'),
    (6, 'Resolución'),
    (7, 'Contrato'),
    (8, 'Poder'),
    (9, 'Escritura'),
    (10, 'Certificado'),
    (11, 'Factura');

INSERT INTO etapas_procesales (id, nombre) VALUES
    (1, 'Demanda'),
    (2, 'Contestación'),
    (3, 'Pruebas'),
    (4, 'Sentencia'),
    (5, 'Ejecución');

INSERT INTO documentos (id, carpeta_id, tipo_documento_id, etapa_procesal_id, nombre, palabra_clave, fecha_doc) VALUES
    (1, 1, 1, 1, 'Demanda Inicial - Divorcio', 'divorcio mutuo acuerdo', DATE '2024-03-02'),
    (2, 2, 9, 3, 'Escritura de Bienes Gananciales', 'bienes inmueble', DATE '2024-03-12'),
    (3, 1, 8, NULL, 'Poder Notarial - Divorcio', '', DATE '2024-03-05'),
    (4, 3, 2, 2, 'Contestación - Robo', 'robo defensa', DATE '2024-03-18'),
    (5, 4, 3, 3, 'Escrito de Pruebas - Despido', 'despido pruebas', DATE '2024-02-20'),
    (6, 5, 7, 1, 'Contrato de Construcción', 'contrato obra', DATE '2024-03-11'),
    (7, 5, 4, 3, 'Testimonio - Incumplimiento', 'testimonio contrato', DATE '2024-03-14'),
    (8, 6, 5, 3, 'Peritaje - Sucesión', 'peritaje sucesión', DATE '2023-12-20'),
    (9, 7, 6, 4, 'Resolución - Pensión', 'pensión resolución', DATE '2024-03-22'),
    (10, 8, 10, NULL, 'Certificado de Amparo', '', DATE '2023-09-10'),
    (11, 5, 11, NULL, 'Factura de Honorarios', 'honorarios', DATE '2024-03-15');
";

/// Load the demo dataset into an initialised store.
///
/// Does nothing when the store already has users, so re-running is safe.
pub fn seed_demo(store: &DuckStore) -> Result<SeedSummary, StoreError> {
    let existing = store.count("SELECT count(*)::BIGINT FROM usuarios", params![])?;
    if existing > 0 {
        info!(users = existing, "store already populated, skipping seed");
        return Ok(SeedSummary {
            users: existing,
            cases: store.count("SELECT count(*)::BIGINT FROM casos", params![])?,
            documents: store.count("SELECT count(*)::BIGINT FROM documentos", params![])?,
            skipped: true,
        });
    }

    store.execute_batch(DEMO_SQL)?;

    let summary = SeedSummary {
        users: store.count("SELECT count(*)::BIGINT FROM usuarios", params![])?,
        cases: store.count("SELECT count(*)::BIGINT FROM casos", params![])?,
        documents: store.count("SELECT count(*)::BIGINT FROM documentos", params![])?,
        skipped: false,
    };
    info!(
        users = summary.users,
        cases = summary.cases,
        documents = summary.documents,
        "demo data loaded"
    );
    Ok(summary)
}
