/// Keyword rules assigning a functional description to a component name.
/// Evaluated top to bottom; the first rule with any keyword contained in the
/// lowercased name wins.
pub const DESCRIPTION_RULES: &[(&[&str], &str)] = &[
    (&["contator"], "Dispositivo para manobra de altas cargas elétricas."),
    (&["disjuntor"], "Proteção essencial contra curtos e sobrecargas."),
    (&["relé", "rele"], "Monitoramento, temporização ou proteção térmica."),
    (&["sinaleiro", "led"], "Indicador visual de status (Ligado/Falha)."),
    (&["botão", "botao"], "Interface de comando manual para operador."),
    (&["chave"], "Seletor de modo (Manual/Automático/Desligado)."),
    (&["borne"], "Ponto de conexão para fiação segura."),
    (&["inversor"], "Controle preciso de velocidade para motores."),
    (&["clp", "plc"], "Controlador Lógico: O cérebro da automação."),
    (&["fonte"], "Converte tensão para alimentar o comando (24Vcc)."),
    (&["cabo", "fio"], "Condutor elétrico para potência ou comando."),
    (&["trilho", "canaleta"], "Acessório para montagem e organização."),
];

pub const FALLBACK_DESCRIPTION: &str = "Componente eletroeletrônico do painel.";

fn matches(name_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name_lower.contains(k))
}

pub fn describe(component: &str) -> &'static str {
    let name = component.to_lowercase();
    DESCRIPTION_RULES
        .iter()
        .find(|(keywords, _)| matches(&name, keywords))
        .map(|(_, description)| *description)
        .unwrap_or(FALLBACK_DESCRIPTION)
}
