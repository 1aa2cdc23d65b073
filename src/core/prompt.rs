use crate::domain::model::{PromptMessage, SearchDocument};

/// Used in place of the context when the search index returned nothing.
pub const EMPTY_CONTEXT: &str = "informações disponíveis";

/// Header separating retrieved passages from their source pages.
pub const REFERENCES_HEADER: &str = "\n\nReferências:\n";

pub const SYSTEM_MESSAGE_TEMPLATE: &str = r#"
    Como assistente de IA, você deve ajudar no atendimento de chamados/tickets de suporte sobre o Sinacor, fornecendo informações relevantes para resolver as questões levantadas pelos usuários.

    - **Fontes de Informação**: Responda exclusivamente com base nas informações disponíveis no contexto fornecido em {context}. Se não houver informações suficientes para responder à pergunta, informe que não é possível responder com base nas informações disponíveis.

    - **Formato da Resposta**: Estruture a resposta da seguinte maneira:
        1. Responda diretamente à pergunta de forma clara e concisa, sempre em português (pt-br).
        2. Questões não relacionadas ao Sinacor não devem ser respondidas. Nesses casos, informe que não é possível responder com base nas informações disponíveis.
        3. Forneça detalhes relevantes em formato de lista, se necessário.
        4. Inclua a origem das informações na seção "Referências" do contexto fornecido. As referências devem ser listadas no seguinte formato: 'nome_do_arquivo#page=numero_da_página'. Por exemplo: 'ga prime - stvm.pdf#page=1'.
        5. Se não houver referências, informe que não é possível responder com base nas informações disponíveis.
        6. Certifique-se de que todas as respostas terminem com a seção de referências, conforme exemplo abaixo:

    - **Exemplo de Pergunta/Resposta**:
        ***Pergunta***: O que é o FixGear?

        ***Resposta***:
        O FixGear é um sistema do Sinacor responsável pela comunicação com o SMPFlash e pela recepção das mensagens, distribuindo-as para os sistemas que utilizarão os dados das mensagens.

            Referências:
            - ga prime - stvm.pdf#page=2
            - reinvestimento de tesouro direto.pdf#page=1

    Mantenha um tom impessoal, educado e profissional em todas as respostas, priorizando a clareza para auxiliar no atendimento ao chamado/ticket de suporte.
    "#;

/// Concatenates retrieved passages, in retrieval order, and appends the
/// collected source pages under a references header.
pub fn build_context<'a, I>(documents: I) -> String
where
    I: IntoIterator<Item = &'a SearchDocument>,
{
    let mut context = String::new();
    let mut references = Vec::new();

    for doc in documents {
        context.push('\n');
        context.push_str(&doc.content);
        if let Some(page) = &doc.sourcepage {
            references.push(page.as_str());
        }
    }

    if !references.is_empty() {
        context.push_str(REFERENCES_HEADER);
        context.push_str(&references.join("\n"));
    }

    context.trim().to_string()
}

pub fn create_system_message(context: &str) -> PromptMessage {
    let context = if context.is_empty() { EMPTY_CONTEXT } else { context };
    PromptMessage::system(SYSTEM_MESSAGE_TEMPLATE.replace("{context}", context))
}

/// System instructions, then prior turns, then the user's question.
pub fn create_prompt(
    context: &str,
    history: Vec<PromptMessage>,
    user_message: &str,
) -> Vec<PromptMessage> {
    let mut prompt = Vec::with_capacity(history.len() + 2);
    prompt.push(create_system_message(context));
    prompt.extend(history);
    prompt.push(PromptMessage::user(user_message));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PromptRole;

    fn doc(content: &str, page: Option<&str>) -> SearchDocument {
        SearchDocument {
            content: content.to_string(),
            sourcepage: page.map(str::to_string),
        }
    }

    #[test]
    fn test_context_with_references() {
        let docs = vec![
            doc("O FixGear é um sistema.", Some("ga prime - stvm.pdf#page=2")),
            doc("Sem página.", None),
            doc("Tesouro direto.", Some("reinvestimento de tesouro direto.pdf#page=1")),
        ];

        assert_eq!(
            build_context(&docs),
            "O FixGear é um sistema.\nSem página.\nTesouro direto.\n\nReferências:\n\
             ga prime - stvm.pdf#page=2\nreinvestimento de tesouro direto.pdf#page=1"
        );
    }

    #[test]
    fn test_context_without_references() {
        let docs = vec![doc("  trecho  ", None)];
        assert_eq!(build_context(&docs), "trecho");
        assert_eq!(build_context(&Vec::new()), "");
    }

    #[test]
    fn test_system_message_injects_context() {
        let message = create_system_message("Contexto X");
        assert_eq!(message.role, PromptRole::System);
        assert!(message.content.contains("contexto fornecido em Contexto X."));
        assert!(!message.content.contains("{context}"));
    }

    #[test]
    fn test_empty_context_falls_back() {
        let message = create_system_message("");
        assert!(message.content.contains("contexto fornecido em informações disponíveis."));
    }

    #[test]
    fn test_prompt_order() {
        let prompt = create_prompt(
            "ctx",
            vec![PromptMessage::user("antes"), PromptMessage::assistant("resposta")],
            "agora",
        );

        assert_eq!(prompt.len(), 4);
        assert_eq!(prompt[0].role, PromptRole::System);
        assert_eq!(prompt[1], PromptMessage::user("antes"));
        assert_eq!(prompt[2], PromptMessage::assistant("resposta"));
        assert_eq!(prompt[3], PromptMessage::user("agora"));
    }
}
