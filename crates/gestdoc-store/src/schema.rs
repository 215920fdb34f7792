//! DDL for the case/document tables and the chat tables.
//!
//! Table and column names follow the case-management schema the rest of the
//! office software writes to; the engine only reads the domain tables.

/// Domain tables: accounts, actors and their subtypes, cases, folders, documents.
pub const DOMAIN_DDL: &str = "
CREATE TABLE IF NOT EXISTS usuarios (
    id          BIGINT PRIMARY KEY,
    username    VARCHAR NOT NULL UNIQUE,
    is_active   BOOLEAN NOT NULL DEFAULT true,
    rol         VARCHAR
);
CREATE TABLE IF NOT EXISTS actores (
    id                BIGINT PRIMARY KEY,
    usuario_id        BIGINT UNIQUE,
    tipo_actor        VARCHAR NOT NULL,
    nombres           VARCHAR NOT NULL,
    apellido_paterno  VARCHAR NOT NULL,
    apellido_materno  VARCHAR NOT NULL DEFAULT '',
    ci                VARCHAR NOT NULL UNIQUE,
    telefono          VARCHAR NOT NULL DEFAULT '',
    estado            VARCHAR NOT NULL DEFAULT 'ACTIVO'
);
CREATE TABLE IF NOT EXISTS abogados (
    actor_id         BIGINT PRIMARY KEY,
    nro_credencial   VARCHAR NOT NULL,
    especialidad     VARCHAR NOT NULL DEFAULT '',
    estado_licencia  VARCHAR NOT NULL DEFAULT 'VIGENTE'
);
CREATE TABLE IF NOT EXISTS clientes (
    actor_id       BIGINT PRIMARY KEY,
    tipo_cliente   VARCHAR NOT NULL,
    observaciones  VARCHAR NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS asistentes (
    actor_id  BIGINT PRIMARY KEY,
    area      VARCHAR NOT NULL DEFAULT '',
    cargo     VARCHAR NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS casos (
    id            BIGINT PRIMARY KEY,
    nro_caso      VARCHAR NOT NULL UNIQUE,
    tipo_caso     VARCHAR NOT NULL,
    descripcion   VARCHAR NOT NULL DEFAULT '',
    estado        VARCHAR NOT NULL DEFAULT 'ABIERTO',
    prioridad     VARCHAR NOT NULL DEFAULT 'MEDIA',
    fecha_inicio  DATE,
    fecha_fin     DATE
);
CREATE TABLE IF NOT EXISTS equipo_caso (
    actor_id       BIGINT NOT NULL,
    caso_id        BIGINT NOT NULL,
    rol_en_equipo  VARCHAR NOT NULL,
    PRIMARY KEY (actor_id, caso_id)
);
CREATE TABLE IF NOT EXISTS partes_procesales (
    cliente_id    BIGINT NOT NULL,
    caso_id       BIGINT NOT NULL,
    rol_procesal  VARCHAR NOT NULL,
    PRIMARY KEY (cliente_id, caso_id)
);
CREATE TABLE IF NOT EXISTS expedientes (
    id              BIGINT PRIMARY KEY,
    caso_id         BIGINT NOT NULL UNIQUE,
    nro_expediente  VARCHAR NOT NULL,
    estado          VARCHAR NOT NULL DEFAULT 'ABIERTO'
);
CREATE TABLE IF NOT EXISTS carpetas (
    id                BIGINT PRIMARY KEY,
    expediente_id     BIGINT NOT NULL,
    nombre            VARCHAR NOT NULL,
    carpeta_padre_id  BIGINT
);
CREATE TABLE IF NOT EXISTS tipos_documento (
    id      BIGINT PRIMARY KEY,
    nombre  VARCHAR NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS etapas_procesales (
    id      BIGINT PRIMARY KEY,
    nombre  VARCHAR NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS documentos (
    id                 BIGINT PRIMARY KEY,
    carpeta_id         BIGINT NOT NULL,
    tipo_documento_id  BIGINT NOT NULL,
    etapa_procesal_id  BIGINT,
    nombre             VARCHAR NOT NULL,
    palabra_clave      VARCHAR NOT NULL DEFAULT '',
    fecha_doc          DATE,
    estado             VARCHAR NOT NULL DEFAULT 'ACTIVO'
);
";

/// Chat tables. Ids come from sequences so inserts can use `RETURNING id`.
pub const CHAT_DDL: &str = "
CREATE SEQUENCE IF NOT EXISTS seq_conversaciones START 1;
CREATE SEQUENCE IF NOT EXISTS seq_mensajes START 1;
CREATE TABLE IF NOT EXISTS conversaciones (
    id              BIGINT PRIMARY KEY DEFAULT nextval('seq_conversaciones'),
    usuario_id      BIGINT NOT NULL,
    titulo          VARCHAR NOT NULL,
    activa          BOOLEAN NOT NULL DEFAULT true,
    creada_en       VARCHAR NOT NULL,
    actualizada_en  VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS mensajes (
    id                      BIGINT PRIMARY KEY DEFAULT nextval('seq_mensajes'),
    conversacion_id         BIGINT NOT NULL,
    tipo                    VARCHAR NOT NULL,
    contenido               VARCHAR NOT NULL,
    enviado_en              VARCHAR NOT NULL,
    tokens_usados           BIGINT,
    tiempo_respuesta        DOUBLE,
    documentos_consultados  VARCHAR NOT NULL DEFAULT '[]',
    entidades_extraidas     VARCHAR NOT NULL DEFAULT '[]'
);
";

/// Tables that must exist before the engine can answer questions.
pub const REQUIRED_TABLES: &[&str] = &[
    "usuarios",
    "actores",
    "casos",
    "expedientes",
    "carpetas",
    "documentos",
    "conversaciones",
    "mensajes",
];
