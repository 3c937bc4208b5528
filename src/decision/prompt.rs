use crate::github::{ReadmeContent, RepositoryMetadata};

/// Build the prompt asking the model to analyse the repository and answer
/// with an `ANALYSIS:` section followed by a `DECISION:` line.
///
/// Output depends only on the inputs.
pub fn build_analysis_prompt(metadata: &RepositoryMetadata, readme: &ReadmeContent) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "\nYou are analyzing a GitHub repository to decide if it should be starred. \
         Here's the information:\n\n",
    );
    prompt.push_str(&format!("Repository: {}\n", metadata.name));
    prompt.push_str(&format!("Owner: {}\n", metadata.owner_login));
    prompt.push_str(&format!(
        "Description: {}\n",
        metadata.description.as_deref().unwrap_or("No description")
    ));
    prompt.push_str(&format!(
        "Language: {}\n",
        metadata.language.as_deref().unwrap_or("Not specified")
    ));
    prompt.push_str(&format!("Current Stars: {}\n", metadata.stargazers_count));
    prompt.push_str(&format!("Created: {}\n\n", metadata.created_at));

    prompt.push_str("README/Content:\n");
    prompt.push_str(&readme.text);
    prompt.push_str("\n\n");

    prompt.push_str("Please analyze this repository step by step:\n\n");
    prompt.push_str(
        "1. ANALYSIS: First, provide your detailed analysis of the repository considering:\n",
    );
    prompt.push_str("   - Is it useful, innovative, or well-documented?\n");
    prompt.push_str("   - Does it solve a real problem?\n");
    prompt.push_str("   - Is the code quality likely to be good based on the README?\n");
    prompt.push_str("   - Would this be valuable to developers?\n\n");
    prompt.push_str("2. DECISION: Then, respond with EXACTLY one of these options:\n");
    prompt.push_str("   - \"STAR: [reason]\" if it should be starred\n");
    prompt.push_str("   - \"SKIP: [reason]\" if it should not be starred\n\n");
    prompt.push_str("Format your response like this:\n");
    prompt.push_str("ANALYSIS: [your detailed thinking here]\n");
    prompt.push_str("DECISION: STAR/SKIP: [brief reason]\n");

    prompt
}
